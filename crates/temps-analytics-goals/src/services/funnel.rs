use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use temps_core::DateRange;
use temps_entities::goals;
use tracing::debug;

use crate::error::GoalError;
use crate::types::{
    round2, FunnelComparison, FunnelReport, FunnelStepReport, GoalScope, StepBottleneck,
};

/// What a visitor must have done to count for a funnel step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunnelStepCriteria {
    /// Custom event with this name (or event type when unnamed)
    Event { event_name: String },
    /// Page view of exactly this path
    PageView { path: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStepDefinition {
    pub name: Option<String>,
    pub criteria: FunnelStepCriteria,
}

impl FunnelStepDefinition {
    /// Display name, defaulting to the event name or path
    pub fn display_name(&self) -> String {
        match (&self.name, &self.criteria) {
            (Some(name), _) => name.clone(),
            (None, FunnelStepCriteria::Event { event_name }) => event_name.clone(),
            (None, FunnelStepCriteria::PageView { path }) => path.clone(),
        }
    }

    /// Parse one stored step: `{"type": "event"|"pageview", "criteria": {...}, "name"?}`
    pub fn parse(step: &Value) -> Result<Self, String> {
        let step_type = step
            .get("type")
            .and_then(Value::as_str)
            .ok_or("step type is required")?;
        let criteria = step.get("criteria").unwrap_or(&Value::Null);
        let field = |key: &str| -> Result<String, String> {
            criteria
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| format!("{} step requires criteria.{}", step_type, key))
        };

        let criteria = match step_type {
            "event" => FunnelStepCriteria::Event {
                event_name: field("event_name")?,
            },
            "pageview" | "page_view" => FunnelStepCriteria::PageView {
                path: field("path")?,
            },
            other => return Err(format!("unknown step type '{}'", other)),
        };

        let name = match step.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(_) => return Err("step name must be a string".to_string()),
        };

        Ok(Self { name, criteria })
    }
}

/// Parse a stored `funnel_steps` array; an empty result is allowed here
pub fn parse_funnel_steps(steps: &Value) -> Result<Vec<FunnelStepDefinition>, String> {
    match steps {
        Value::Null => Ok(Vec::new()),
        Value::Array(steps) => steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                FunnelStepDefinition::parse(step).map_err(|e| format!("step {}: {}", index, e))
            })
            .collect(),
        _ => Err("funnel_steps must be an array".to_string()),
    }
}

/// Steps of a goal, failing when the goal cannot be analyzed as a funnel
pub fn goal_funnel_steps(goal: &goals::Model) -> Result<Vec<FunnelStepDefinition>, GoalError> {
    let steps = match &goal.funnel_steps {
        Some(steps) => parse_funnel_steps(steps).map_err(|message| {
            GoalError::configuration(format!("goal {} has invalid funnel steps: {}", goal.id, message))
        })?,
        None => Vec::new(),
    };

    if steps.is_empty() {
        return Err(GoalError::configuration(format!(
            "goal {} has no funnel steps",
            goal.id
        )));
    }

    Ok(steps)
}

/// Resolves the distinct visitors that satisfied a step within a range
#[async_trait]
pub trait VisitorQuery: Send + Sync {
    async fn distinct_visitors(
        &self,
        criteria: &FunnelStepCriteria,
        range: &DateRange,
    ) -> Result<HashSet<i32>, GoalError>;
}

/// Computes funnel conversion reports for goals with funnel steps.
///
/// Every step is counted independently over the whole range: a visitor
/// reaching step 3 counts for step 3 whether or not it did steps 1 and 2,
/// and no ordering in time is required.
pub struct FunnelAnalyzer<Q: VisitorQuery> {
    query: Q,
    scope: GoalScope,
}

impl<Q: VisitorQuery> FunnelAnalyzer<Q> {
    pub fn new(query: Q, scope: GoalScope) -> Self {
        Self { query, scope }
    }

    pub async fn analyze(
        &self,
        goal: &goals::Model,
        range: &DateRange,
    ) -> Result<FunnelReport, GoalError> {
        if goal.project_id != self.scope.project_id {
            return Err(GoalError::goal_not_found(goal.id));
        }

        let steps = goal_funnel_steps(goal)?;

        let mut counts = Vec::with_capacity(steps.len());
        for step in &steps {
            let visitors = self.query.distinct_visitors(&step.criteria, range).await?;
            counts.push(visitors.len() as u64);
        }

        debug!("Funnel for goal {} step visitors: {:?}", goal.id, counts);

        Ok(build_report(goal, *range, &steps, &counts))
    }

    pub async fn compare(
        &self,
        goal: &goals::Model,
        current_range: &DateRange,
        previous_range: &DateRange,
    ) -> Result<FunnelComparison, GoalError> {
        let current = self.analyze(goal, current_range).await?;
        let previous = self.analyze(goal, previous_range).await?;
        let change = round2(current.overall_conversion - previous.overall_conversion);

        Ok(FunnelComparison {
            current,
            previous,
            change,
        })
    }

    /// Steps ranked by drop-off, highest first. The first step is never a
    /// bottleneck; ties keep funnel order.
    pub async fn get_bottlenecks(
        &self,
        goal: &goals::Model,
        range: &DateRange,
        limit: usize,
    ) -> Result<Vec<StepBottleneck>, GoalError> {
        let report = self.analyze(goal, range).await?;
        Ok(rank_bottlenecks(&report, limit))
    }
}

fn build_report(
    goal: &goals::Model,
    range: DateRange,
    steps: &[FunnelStepDefinition],
    counts: &[u64],
) -> FunnelReport {
    let step_reports = steps
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(index, (step, &visitors))| {
            let conversion_rate = if index == 0 {
                100.0
            } else {
                percentage(visitors, counts[index - 1])
            };
            let dropoff_rate = if index == 0 {
                0.0
            } else {
                round2(100.0 - conversion_rate)
            };

            FunnelStepReport {
                step_index: index,
                name: step.display_name(),
                visitors,
                conversion_rate,
                dropoff_rate,
            }
        })
        .collect();

    let overall_conversion = match (counts.first(), counts.last()) {
        (Some(&first), Some(&last)) => percentage(last, first),
        _ => 0.0,
    };

    FunnelReport {
        goal_id: goal.id,
        goal_name: goal.name.clone(),
        range,
        steps: step_reports,
        overall_conversion,
    }
}

/// `part / whole * 100` rounded to two decimals, 0 when `whole` is 0
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn rank_bottlenecks(report: &FunnelReport, limit: usize) -> Vec<StepBottleneck> {
    let mut bottlenecks: Vec<StepBottleneck> = report
        .steps
        .windows(2)
        .map(|pair| StepBottleneck {
            step_index: pair[1].step_index,
            name: pair[1].name.clone(),
            previous_visitors: pair[0].visitors,
            visitors: pair[1].visitors,
            dropoff_rate: pair[1].dropoff_rate,
        })
        .collect();

    bottlenecks.sort_by(|a, b| b.dropoff_rate.total_cmp(&a.dropoff_rate));
    bottlenecks.truncate(limit);
    bottlenecks
}
