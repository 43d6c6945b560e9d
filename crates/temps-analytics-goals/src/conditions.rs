//! Goal condition matching
//!
//! [`Condition`] evaluates one operator-tagged rule against one observed
//! value and never fails: unknown operators, malformed patterns and missing
//! values all evaluate to `false`. [`GoalConditions`] is the typed form of a
//! goal's stored condition block, parsed once per evaluation so a malformed
//! goal can be skipped on its own.

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use temps_entities::types::GoalType;

use crate::types::{EventTrigger, PageViewTrigger, Trigger};
use crate::value::lookup_path;

/// One condition on an observed value
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(Value),
    Neq(Value),
    Gt(Value),
    Lt(Value),
    Gte(Value),
    Lte(Value),
    Contains(Value),
    StartsWith(Value),
    EndsWith(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    /// `None` when the pattern did not compile
    Regex(Option<Regex>),
    /// Every inner condition must hold
    All(Vec<Condition>),
    /// Unknown operator or unusable target; never matches
    Unsupported(String),
}

impl Condition {
    /// Parse a condition definition.
    ///
    /// - scalar: equality with the observed value
    /// - array: membership
    /// - `{"operator": "gt", "value": 10}`: explicit form, missing operator means `eq`
    /// - `{"gt": 10, "lt": 20}`: operator keys, all of which must hold
    pub fn parse(expected: &Value) -> Self {
        match expected {
            Value::Object(map) if map.contains_key("operator") || map.contains_key("value") => {
                let op = map
                    .get("operator")
                    .and_then(Value::as_str)
                    .unwrap_or("eq");
                let target = map.get("value").cloned().unwrap_or(Value::Null);
                Self::from_operator(op, target)
            }
            Value::Object(map) => {
                let mut conditions: Vec<Condition> = map
                    .iter()
                    .map(|(op, target)| Self::from_operator(op, target.clone()))
                    .collect();
                match conditions.len() {
                    0 => Condition::Unsupported("empty operator object".to_string()),
                    1 => conditions.remove(0),
                    _ => Condition::All(conditions),
                }
            }
            Value::Array(values) => Condition::In(values.clone()),
            scalar => Condition::Eq(scalar.clone()),
        }
    }

    fn from_operator(op: &str, target: Value) -> Self {
        match op {
            "eq" | "equals" => Condition::Eq(target),
            "neq" | "not_equals" => Condition::Neq(target),
            "gt" => Condition::Gt(target),
            "lt" => Condition::Lt(target),
            "gte" => Condition::Gte(target),
            "lte" => Condition::Lte(target),
            "contains" => Condition::Contains(target),
            "starts_with" => Condition::StartsWith(target),
            "ends_with" => Condition::EndsWith(target),
            "in" | "not_in" => match target {
                Value::Array(values) if op == "in" => Condition::In(values),
                Value::Array(values) => Condition::NotIn(values),
                _ => Condition::Unsupported(format!("'{}' expects an array", op)),
            },
            "regex" => Condition::Regex(target.as_str().and_then(compile_preg)),
            other => Condition::Unsupported(format!("unknown operator '{}'", other)),
        }
    }

    /// Evaluate against an observed value; absent values count as null
    pub fn matches(&self, observed: Option<&Value>) -> bool {
        let observed = match observed {
            None | Some(Value::Null) => return self.matches_null(),
            Some(value) => value,
        };

        match self {
            Condition::Eq(target) => loose_eq(observed, target),
            Condition::Neq(target) => !loose_eq(observed, target),
            Condition::Gt(target) => compare(observed, target, |a, b| a > b),
            Condition::Lt(target) => compare(observed, target, |a, b| a < b),
            Condition::Gte(target) => compare(observed, target, |a, b| a >= b),
            Condition::Lte(target) => compare(observed, target, |a, b| a <= b),
            Condition::Contains(target) => {
                string_test(observed, target, |haystack, needle| haystack.contains(needle))
            }
            Condition::StartsWith(target) => {
                string_test(observed, target, |haystack, prefix| haystack.starts_with(prefix))
            }
            Condition::EndsWith(target) => {
                string_test(observed, target, |haystack, suffix| haystack.ends_with(suffix))
            }
            Condition::In(targets) => targets.iter().any(|t| loose_eq(observed, t)),
            Condition::NotIn(targets) => !targets.iter().any(|t| loose_eq(observed, t)),
            Condition::Regex(Some(re)) => coerce_string(observed)
                .map(|s| re.is_match(&s))
                .unwrap_or(false),
            Condition::Regex(None) => false,
            Condition::All(conditions) => conditions.iter().all(|c| c.matches(Some(observed))),
            Condition::Unsupported(_) => false,
        }
    }

    /// A missing value only satisfies exclusions of non-null targets
    fn matches_null(&self) -> bool {
        match self {
            Condition::Neq(target) => !target.is_null(),
            Condition::NotIn(targets) => !targets.iter().any(Value::is_null),
            Condition::All(conditions) => conditions.iter().all(Condition::matches_null),
            _ => false,
        }
    }
}

/// Shorthand for `Condition::parse(expected).matches(observed)`
pub fn matches(observed: Option<&Value>, expected: &Value) -> bool {
    Condition::parse(expected).matches(observed)
}

/// Numeric view of a value: numbers and numeric strings
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => serde_json::to_string(other).ok(),
    }
}

/// Equality with numeric coercion when both sides are numeric
fn loose_eq(observed: &Value, target: &Value) -> bool {
    if let (Some(a), Some(b)) = (coerce_number(observed), coerce_number(target)) {
        return a == b;
    }
    match (coerce_string(observed), coerce_string(target)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn compare(observed: &Value, target: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
    match (coerce_number(observed), coerce_number(target)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn string_test(observed: &Value, target: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    match (coerce_string(observed), coerce_string(target)) {
        (Some(haystack), Some(needle)) => test(&haystack, &needle),
        _ => false,
    }
}

/// Compile a PCRE-style pattern such as `/^\/blog\//i`.
///
/// Delimiters and the trailing `i`, `m`, `s`, `x`, `u`, `U` and `D` flags are
/// understood; a pattern not starting with a delimiter is used as is. Returns
/// `None` for anything that does not compile, including a pattern whose
/// opening delimiter is never closed.
pub fn compile_preg(pattern: &str) -> Option<Regex> {
    let (body, flags) = match pattern.chars().next() {
        Some(delimiter) if PREG_DELIMITERS.contains(&delimiter) => {
            split_delimiters(pattern, delimiter)?
        }
        _ => (pattern, ""),
    };

    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'U' => builder.swap_greed(true),
            'u' | 'D' => &mut builder,
            _ => return None,
        };
    }

    builder.build().ok()
}

const PREG_DELIMITERS: [char; 7] = ['/', '#', '~', '@', '!', '%', ';'];

fn split_delimiters(pattern: &str, delimiter: char) -> Option<(&str, &str)> {
    let rest = &pattern[delimiter.len_utf8()..];
    let end = rest.rfind(delimiter)?;
    Some((&rest[..end], &rest[end + delimiter.len_utf8()..]))
}

/// Anchored glob where `*` matches any run of characters
pub fn compile_glob(pattern: &str) -> Option<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}$", body)).ok()
}

/// Conditions of an `event` goal; every present clause must hold
#[derive(Debug, Clone, Default)]
pub struct EventConditions {
    pub event_name: Option<String>,
    pub event_category: Option<String>,
    pub min_value: Option<f64>,
    /// Property dot-path to condition
    pub property_matches: Vec<(String, Condition)>,
}

impl EventConditions {
    pub fn matches(&self, event: &EventTrigger) -> bool {
        if let Some(name) = &self.event_name {
            if &event.name != name {
                return false;
            }
        }
        if let Some(category) = &self.event_category {
            if event.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(min_value) = self.min_value {
            match event.value {
                Some(value) if value >= min_value => {}
                _ => return false,
            }
        }

        self.property_matches
            .iter()
            .all(|(path, condition)| condition.matches(lookup_path(&event.properties, path)))
    }
}

/// The single rule a `pageview` goal applies, chosen by precedence at parse time
#[derive(Debug, Clone)]
pub enum PageViewRule {
    Exact(String),
    Pattern { pattern: String, regex: Regex },
    Regex(Regex),
    Contains(String),
}

impl PageViewRule {
    pub fn matches(&self, page_view: &PageViewTrigger) -> bool {
        let path = page_view.path.as_str();
        match self {
            PageViewRule::Exact(expected) => path == expected,
            PageViewRule::Pattern { regex, .. } => regex.is_match(path),
            PageViewRule::Regex(regex) => regex.is_match(path),
            PageViewRule::Contains(needle) => path.contains(needle.as_str()),
        }
    }
}

/// Typed condition block of a goal
#[derive(Debug, Clone)]
pub enum GoalConditions {
    Event(EventConditions),
    PageView(PageViewRule),
    Duration { min_seconds: f64 },
    PagesPerSession { min_pages: f64 },
}

impl GoalConditions {
    /// Parse the stored JSON for a goal of the given type.
    /// The error is a human readable description of what is wrong.
    pub fn parse(goal_type: GoalType, conditions: &Value) -> Result<Self, String> {
        let map = match conditions {
            Value::Object(map) => map,
            Value::Null => return Err("conditions are missing".to_string()),
            _ => return Err("conditions must be a JSON object".to_string()),
        };

        match goal_type {
            GoalType::Event => parse_event_conditions(map).map(GoalConditions::Event),
            GoalType::Pageview => parse_pageview_rule(map).map(GoalConditions::PageView),
            GoalType::Duration => Ok(GoalConditions::Duration {
                min_seconds: required_number(map, "min_seconds")?,
            }),
            GoalType::PagesPerSession => Ok(GoalConditions::PagesPerSession {
                min_pages: required_number(map, "min_pages")?,
            }),
        }
    }

    /// Whether the trigger satisfies these conditions.
    /// A trigger of the wrong kind never does.
    pub fn matches(&self, trigger: &Trigger) -> bool {
        match (self, trigger) {
            (GoalConditions::Event(conditions), Trigger::Event(event)) => conditions.matches(event),
            (GoalConditions::PageView(rule), Trigger::PageView(page_view)) => {
                rule.matches(page_view)
            }
            (GoalConditions::Duration { min_seconds }, Trigger::Session(session)) => {
                session.duration_seconds as f64 >= *min_seconds
            }
            (GoalConditions::PagesPerSession { min_pages }, Trigger::Session(session)) => {
                f64::from(session.page_count) >= *min_pages
            }
            _ => false,
        }
    }
}

fn optional_string(map: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("{} must be a string", key)),
    }
}

fn optional_number(map: &Map<String, Value>, key: &str) -> Result<Option<f64>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce_number(value)
            .map(Some)
            .ok_or_else(|| format!("{} must be numeric", key)),
    }
}

fn required_number(map: &Map<String, Value>, key: &str) -> Result<f64, String> {
    optional_number(map, key)?.ok_or_else(|| format!("{} is required", key))
}

fn parse_event_conditions(map: &Map<String, Value>) -> Result<EventConditions, String> {
    let property_matches = match map.get("property_matches") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(properties)) => properties
            .iter()
            .map(|(path, expected)| (path.clone(), Condition::parse(expected)))
            .collect(),
        Some(_) => return Err("property_matches must be an object".to_string()),
    };

    Ok(EventConditions {
        event_name: optional_string(map, "event_name")?,
        event_category: optional_string(map, "event_category")?,
        min_value: optional_number(map, "min_value")?,
        property_matches,
    })
}

fn parse_pageview_rule(map: &Map<String, Value>) -> Result<PageViewRule, String> {
    if let Some(path) = optional_string(map, "path_exact")? {
        return Ok(PageViewRule::Exact(path));
    }
    if let Some(pattern) = optional_string(map, "path_pattern")? {
        let regex = compile_glob(&pattern)
            .ok_or_else(|| format!("path_pattern '{}' is not a valid pattern", pattern))?;
        return Ok(PageViewRule::Pattern { pattern, regex });
    }
    if let Some(pattern) = optional_string(map, "path_regex")? {
        let regex = compile_preg(&pattern)
            .ok_or_else(|| format!("path_regex '{}' does not compile", pattern))?;
        return Ok(PageViewRule::Regex(regex));
    }
    if let Some(needle) = optional_string(map, "path_contains")? {
        return Ok(PageViewRule::Contains(needle));
    }

    Err("one of path_exact, path_pattern, path_regex or path_contains is required".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionTrigger;
    use serde_json::json;

    fn check(observed: Value, expected: Value) -> bool {
        matches(Some(&observed), &expected)
    }

    #[test]
    fn test_scalar_equality_with_numeric_coercion() {
        assert!(check(json!("premium"), json!("premium")));
        assert!(!check(json!("premium"), json!("free")));
        assert!(check(json!("10"), json!(10)));
        assert!(check(json!(10.0), json!("10")));
        assert!(!check(json!("10"), json!(11)));
        assert!(check(json!(true), json!("true")));
    }

    #[test]
    fn test_eq_and_neq() {
        assert!(check(json!("a"), json!({"eq": "a"})));
        assert!(!check(json!("a"), json!({"eq": "b"})));
        assert!(check(json!("a"), json!({"neq": "b"})));
        assert!(!check(json!("5"), json!({"neq": 5})));
    }

    #[test]
    fn test_numeric_comparisons() {
        assert!(check(json!(150), json!({"gt": 100})));
        assert!(!check(json!(100), json!({"gt": 100})));
        assert!(check(json!(50), json!({"lt": 100})));
        assert!(!check(json!(150), json!({"lt": 100})));
        assert!(check(json!(100), json!({"gte": 100})));
        assert!(!check(json!(99.5), json!({"gte": 100})));
        assert!(check(json!("100"), json!({"lte": 100})));
        assert!(!check(json!(101), json!({"lte": 100})));
    }

    #[test]
    fn test_numeric_comparison_with_non_numeric_observed_is_false() {
        assert!(!check(json!("lots"), json!({"gt": 1})));
        assert!(!check(json!("lots"), json!({"lt": 1})));
        assert!(!check(json!(true), json!({"gte": 0})));
    }

    #[test]
    fn test_string_operators() {
        assert!(check(json!("/blog/rust"), json!({"contains": "blog"})));
        assert!(!check(json!("/docs"), json!({"contains": "blog"})));
        assert!(check(json!("/blog/rust"), json!({"starts_with": "/blog"})));
        assert!(!check(json!("/docs/blog"), json!({"starts_with": "/blog"})));
        assert!(check(json!("report.pdf"), json!({"ends_with": ".pdf"})));
        assert!(!check(json!("report.pdf.zip"), json!({"ends_with": ".pdf"})));
        assert!(check(json!(12345), json!({"contains": "234"})));
    }

    #[test]
    fn test_membership() {
        assert!(check(json!("pro"), json!({"in": ["pro", "team"]})));
        assert!(!check(json!("free"), json!({"in": ["pro", "team"]})));
        assert!(check(json!(2), json!({"in": ["1", "2"]})));
        assert!(check(json!("free"), json!({"not_in": ["pro", "team"]})));
        assert!(!check(json!("pro"), json!({"not_in": ["pro", "team"]})));
        assert!(check(json!("team"), json!(["pro", "team"])));
    }

    #[test]
    fn test_membership_requires_array_target() {
        assert!(!check(json!("pro"), json!({"in": "pro"})));
        assert!(!check(json!("free"), json!({"not_in": "pro"})));
    }

    #[test]
    fn test_regex_with_delimiters_and_flags() {
        assert!(check(json!("/Blog/Rust"), json!({"regex": "/^\\/blog\\//i"})));
        assert!(!check(json!("/Blog/Rust"), json!({"regex": "/^\\/blog\\//"})));
        assert!(check(json!("order-123"), json!({"regex": "#^order-\\d+$#"})));
        assert!(check(json!("order-123"), json!({"regex": "^order-\\d+$"})));
        assert!(!check(json!("order-abc"), json!({"regex": "^order-\\d+$"})));
    }

    #[test]
    fn test_malformed_regex_is_false_not_error() {
        assert!(!check(json!("anything"), json!({"regex": "/([a-z/"})));
        assert!(!check(json!("anything"), json!({"regex": "/abc/q"})));
        assert!(!check(json!("anything"), json!({"regex": 42})));
        // Opened but never closed
        assert!(!check(json!("x/abc"), json!({"regex": "/abc"})));
        assert!(!check(json!("#tag"), json!({"regex": "#tag"})));
        assert!(compile_preg("/").is_none());
    }

    #[test]
    fn test_unknown_operator_fails_closed() {
        assert!(!check(json!("x"), json!({"approximately": "x"})));
        assert!(!check(json!("x"), json!({})));
        assert!(!check(json!("x"), json!({"operator": "fuzzy", "value": "x"})));
    }

    #[test]
    fn test_explicit_operator_form() {
        assert!(check(json!(20), json!({"operator": "gte", "value": 20})));
        assert!(check(json!("x"), json!({"value": "x"})));
        assert!(!check(json!("x"), json!({"operator": "neq", "value": "x"})));
    }

    #[test]
    fn test_multiple_operator_keys_are_anded() {
        let expected = json!({"gte": 10, "lt": 20});
        assert!(check(json!(15), expected.clone()));
        assert!(!check(json!(25), expected.clone()));
        assert!(!check(json!(5), expected));
    }

    #[test]
    fn test_missing_value_only_passes_exclusions() {
        assert!(!matches(None, &json!("x")));
        assert!(!matches(None, &json!({"eq": "x"})));
        assert!(!matches(None, &json!({"gt": 0})));
        assert!(!matches(None, &json!({"contains": ""})));
        assert!(!matches(None, &json!({"in": ["x"]})));
        assert!(!matches(None, &json!({"regex": ".*"})));
        assert!(matches(None, &json!({"neq": "x"})));
        assert!(matches(None, &json!({"not_in": ["x", "y"]})));
        assert!(!matches(None, &json!({"neq": null})));
        assert!(!matches(Some(&Value::Null), &json!({"eq": null})));
        assert!(matches(Some(&Value::Null), &json!({"neq": 1})));
    }

    #[test]
    fn test_glob() {
        let glob = compile_glob("/thank-you*").unwrap();
        assert!(glob.is_match("/thank-you"));
        assert!(glob.is_match("/thank-you/order-123"));
        assert!(!glob.is_match("/en/thank-you"));

        let glob = compile_glob("/blog/*/comments").unwrap();
        assert!(glob.is_match("/blog/rust/comments"));
        assert!(!glob.is_match("/blog/rust/comments/2"));

        // Regex metacharacters are literal
        let glob = compile_glob("/search?q=*").unwrap();
        assert!(glob.is_match("/search?q=shoes"));
        assert!(!glob.is_match("/searchXq=shoes"));
    }

    #[test]
    fn test_pageview_precedence_prefers_exact() {
        let conditions = GoalConditions::parse(
            GoalType::Pageview,
            &json!({"path_exact": "/pricing", "path_pattern": "/pricing*"}),
        )
        .unwrap();

        let exact = Trigger::PageView(PageViewTrigger::new("/pricing"));
        let only_pattern = Trigger::PageView(PageViewTrigger::new("/pricing/teams"));
        assert!(conditions.matches(&exact));
        assert!(!conditions.matches(&only_pattern));
    }

    #[test]
    fn test_pageview_rules() {
        let regex = GoalConditions::parse(
            GoalType::Pageview,
            &json!({"path_regex": "/^\\/docs\\/v\\d+/"}),
        )
        .unwrap();
        assert!(regex.matches(&Trigger::PageView(PageViewTrigger::new("/docs/v2/intro"))));
        assert!(!regex.matches(&Trigger::PageView(PageViewTrigger::new("/docs/latest"))));

        let contains =
            GoalConditions::parse(GoalType::Pageview, &json!({"path_contains": "checkout"}))
                .unwrap();
        assert!(contains.matches(&Trigger::PageView(PageViewTrigger::new("/cart/checkout/done"))));
    }

    #[test]
    fn test_malformed_goal_conditions() {
        assert!(GoalConditions::parse(GoalType::Pageview, &json!({})).is_err());
        assert!(GoalConditions::parse(GoalType::Pageview, &json!({"path_regex": "/(/"})).is_err());
        assert!(GoalConditions::parse(GoalType::Duration, &json!({})).is_err());
        assert!(GoalConditions::parse(GoalType::Duration, &json!({"min_seconds": "soon"})).is_err());
        assert!(GoalConditions::parse(GoalType::PagesPerSession, &json!([1, 2])).is_err());
        assert!(GoalConditions::parse(GoalType::Event, &json!({"event_name": 5})).is_err());
        assert!(
            GoalConditions::parse(GoalType::Event, &json!({"property_matches": ["plan"]}))
                .is_err()
        );
        assert!(GoalConditions::parse(GoalType::Event, &Value::Null).is_err());
    }

    #[test]
    fn test_event_conditions() {
        let conditions = GoalConditions::parse(
            GoalType::Event,
            &json!({
                "event_name": "purchase",
                "event_category": "shop",
                "min_value": 100,
                "property_matches": {
                    "plan": {"in": ["pro", "team"]},
                    "cart.items": {"gte": 2}
                }
            }),
        )
        .unwrap();

        let mut event = EventTrigger::new("purchase");
        event.category = Some("shop".to_string());
        event.value = Some(150.0);
        event.properties = json!({"plan": "pro", "cart": {"items": 3}})
            .as_object()
            .cloned()
            .unwrap();
        assert!(conditions.matches(&Trigger::Event(event.clone())));

        let mut low_value = event.clone();
        low_value.value = Some(99.0);
        assert!(!conditions.matches(&Trigger::Event(low_value)));

        let mut no_value = event.clone();
        no_value.value = None;
        assert!(!conditions.matches(&Trigger::Event(no_value)));

        let mut other_category = event.clone();
        other_category.category = None;
        assert!(!conditions.matches(&Trigger::Event(other_category)));

        let mut missing_property = event.clone();
        missing_property.properties.remove("cart");
        assert!(!conditions.matches(&Trigger::Event(missing_property)));

        let mut other_name = event;
        other_name.name = "refund".to_string();
        assert!(!conditions.matches(&Trigger::Event(other_name)));
    }

    #[test]
    fn test_session_thresholds() {
        let duration =
            GoalConditions::parse(GoalType::Duration, &json!({"min_seconds": 300})).unwrap();
        assert!(duration.matches(&Trigger::Session(SessionTrigger::new(600, 1))));
        assert!(duration.matches(&Trigger::Session(SessionTrigger::new(300, 1))));
        assert!(!duration.matches(&Trigger::Session(SessionTrigger::new(100, 1))));

        let pages =
            GoalConditions::parse(GoalType::PagesPerSession, &json!({"min_pages": 5})).unwrap();
        assert!(pages.matches(&Trigger::Session(SessionTrigger::new(10, 5))));
        assert!(!pages.matches(&Trigger::Session(SessionTrigger::new(10_000, 4))));
    }

    #[test]
    fn test_wrong_trigger_kind_never_matches() {
        let duration =
            GoalConditions::parse(GoalType::Duration, &json!({"min_seconds": 0})).unwrap();
        assert!(!duration.matches(&Trigger::PageView(PageViewTrigger::new("/"))));

        let event = GoalConditions::parse(GoalType::Event, &json!({})).unwrap();
        assert!(event.matches(&Trigger::Event(EventTrigger::new("anything"))));
        assert!(!event.matches(&Trigger::Session(SessionTrigger::new(1, 1))));
    }
}
