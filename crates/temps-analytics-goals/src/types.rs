use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use temps_core::DateRange;
use temps_entities::{events, request_sessions, types::GoalType, types::GoalValueType};

/// Tenant scope every goal lookup and visitor query is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalScope {
    pub project_id: i32,
    pub environment_id: Option<i32>,
}

impl GoalScope {
    pub fn project(project_id: i32) -> Self {
        Self {
            project_id,
            environment_id: None,
        }
    }

    pub fn with_environment(mut self, environment_id: i32) -> Self {
        self.environment_id = Some(environment_id);
        self
    }
}

/// A custom event as handed over by the ingestion pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTrigger {
    #[serde(default)]
    pub event_id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub visitor_id: Option<i32>,
}

impl EventTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build from a stored custom event; the name falls back to the event type
    pub fn from_event(event: &events::Model) -> Self {
        let properties = match &event.props {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        Self {
            event_id: Some(event.id),
            name: event
                .event_name
                .clone()
                .unwrap_or_else(|| event.event_type.clone()),
            category: event.event_category.clone(),
            properties,
            value: event.value,
            path: Some(event.pathname.clone()),
            session_id: event.session_id.clone(),
            visitor_id: event.visitor_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageViewTrigger {
    #[serde(default)]
    pub page_view_id: Option<i32>,
    pub path: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub visitor_id: Option<i32>,
}

impl PageViewTrigger {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn from_event(event: &events::Model) -> Self {
        Self {
            page_view_id: Some(event.id),
            path: event.pathname.clone(),
            title: event.page_title.clone(),
            session_id: event.session_id.clone(),
            visitor_id: event.visitor_id,
        }
    }
}

/// A finished (or refreshed) session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionTrigger {
    pub duration_seconds: i64,
    pub page_count: i32,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub visitor_id: Option<i32>,
}

impl SessionTrigger {
    pub fn new(duration_seconds: i64, page_count: i32) -> Self {
        Self {
            duration_seconds,
            page_count,
            ..Default::default()
        }
    }

    pub fn from_request_session(session: &request_sessions::Model) -> Self {
        Self {
            duration_seconds: session.duration_seconds(),
            page_count: session.page_count,
            session_id: Some(session.session_id.clone()),
            visitor_id: session.visitor_id,
        }
    }
}

/// The fact being evaluated against goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    Event(EventTrigger),
    #[serde(alias = "pageview")]
    PageView(PageViewTrigger),
    Session(SessionTrigger),
}

impl Trigger {
    /// Page views become `PageView`, everything else `Event`
    pub fn from_event(event: &events::Model) -> Self {
        if event.is_page_view() {
            Trigger::PageView(PageViewTrigger::from_event(event))
        } else {
            Trigger::Event(EventTrigger::from_event(event))
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Trigger::Event(_) => "event",
            Trigger::PageView(_) => "pageview",
            Trigger::Session(_) => "session",
        }
    }

    /// Goal types whose conditions apply to this trigger.
    /// A session is checked against both duration and pages-per-session goals.
    pub fn goal_types(&self) -> &'static [GoalType] {
        match self {
            Trigger::Event(_) => &[GoalType::Event],
            Trigger::PageView(_) => &[GoalType::Pageview],
            Trigger::Session(_) => &[GoalType::Duration, GoalType::PagesPerSession],
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Trigger::Event(e) => e.session_id.as_deref(),
            Trigger::PageView(p) => p.session_id.as_deref(),
            Trigger::Session(s) => s.session_id.as_deref(),
        }
    }

    pub fn visitor_id(&self) -> Option<i32> {
        match self {
            Trigger::Event(e) => e.visitor_id,
            Trigger::PageView(p) => p.visitor_id,
            Trigger::Session(s) => s.visitor_id,
        }
    }

    pub fn event_id(&self) -> Option<i32> {
        match self {
            Trigger::Event(e) => e.event_id,
            _ => None,
        }
    }

    pub fn page_view_id(&self) -> Option<i32> {
        match self {
            Trigger::PageView(p) => p.page_view_id,
            _ => None,
        }
    }

    /// Snapshot stored alongside a conversion
    pub fn metadata(&self) -> Value {
        match self {
            Trigger::Event(e) => json!({
                "trigger": self.kind(),
                "event_name": e.name,
                "event_category": e.category,
                "path": e.path,
                "properties": e.properties,
                "value": e.value,
            }),
            Trigger::PageView(p) => json!({
                "trigger": self.kind(),
                "path": p.path,
                "title": p.title,
            }),
            Trigger::Session(s) => json!({
                "trigger": self.kind(),
                "duration_seconds": s.duration_seconds,
                "page_count": s.page_count,
            }),
        }
    }
}

/// Input for creating a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub conditions: Value,
    #[serde(default)]
    pub value_type: GoalValueType,
    #[serde(default)]
    pub fixed_value: Option<f64>,
    #[serde(default)]
    pub dynamic_value_path: Option<String>,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub funnel_steps: Option<Value>,
}

impl CreateGoalRequest {
    pub fn new(name: impl Into<String>, goal_type: GoalType, conditions: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            goal_type,
            conditions,
            value_type: GoalValueType::None,
            fixed_value: None,
            dynamic_value_path: None,
            allow_multiple: false,
            funnel_steps: None,
        }
    }
}

/// Partial update; absent fields are left unchanged.
///
/// The clearable fields are doubly optional: `None` keeps the stored value,
/// `Some(None)` (JSON `null`) clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGoalRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<GoalValueType>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub fixed_value: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub dynamic_value_path: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_multiple: Option<bool>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub funnel_steps: Option<Option<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A present field, null included, becomes `Some`
fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStepReport {
    pub step_index: usize,
    pub name: String,
    pub visitors: u64,
    pub conversion_rate: f64,
    pub dropoff_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelReport {
    pub goal_id: i32,
    pub goal_name: String,
    pub range: DateRange,
    pub steps: Vec<FunnelStepReport>,
    pub overall_conversion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelComparison {
    pub current: FunnelReport,
    pub previous: FunnelReport,
    /// Percentage-point difference of `overall_conversion`, current minus previous
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepBottleneck {
    pub step_index: usize,
    pub name: String,
    pub previous_visitors: u64,
    pub visitors: u64,
    pub dropoff_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalStats {
    pub goal_id: i32,
    pub goal_name: String,
    pub range: DateRange,
    pub conversions: u64,
    pub unique_visitors: u64,
    pub unique_sessions: u64,
    pub total_value: f64,
    /// None when no conversion in the range carries a value
    pub average_value: Option<f64>,
}

/// Round to two decimals, the precision every reported rate uses
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
