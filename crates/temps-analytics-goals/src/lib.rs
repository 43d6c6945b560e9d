//! Goals analytics module
//!
//! Decides whether behavioral facts (page views, custom events, finished
//! sessions) satisfy configured goals, records each conversion once per the
//! goal's multiplicity policy, and answers multi-step funnel questions.

pub mod conditions;
pub mod error;
pub mod services;
pub mod types;
pub mod value;

pub use conditions::{Condition, EventConditions, GoalConditions, PageViewRule};
pub use error::GoalError;
pub use services::{
    ConversionStatsService, EventsVisitorQuery, FunnelAnalyzer, GoalMatcher, GoalService,
    VisitorQuery,
};
pub use types::*;
pub use value::resolve_value;
