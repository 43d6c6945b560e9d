//! Conversion value resolution

use serde_json::{Map, Value};
use temps_entities::{goals, types::GoalValueType};

use crate::conditions::coerce_number;
use crate::types::Trigger;

/// Numeric value attached to a conversion of `goal` caused by `trigger`.
///
/// `None` means "no monetary value", including when a dynamic path is
/// absent from the trigger or does not hold a number.
pub fn resolve_value(goal: &goals::Model, trigger: &Trigger) -> Option<f64> {
    match goal.value_type {
        GoalValueType::None => None,
        GoalValueType::Fixed => goal.fixed_value,
        GoalValueType::Dynamic => {
            let path = goal.dynamic_value_path.as_deref()?;
            match trigger {
                Trigger::Event(event) => lookup_path(&event.properties, path)
                    .and_then(coerce_number)
                    .filter(|value| value.is_finite()),
                Trigger::PageView(_) | Trigger::Session(_) => None,
            }
        }
    }
}

/// Follow a dot-path such as `order.total` or `items.0.price` through nested
/// objects and arrays
pub fn lookup_path<'a>(properties: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = properties.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}
