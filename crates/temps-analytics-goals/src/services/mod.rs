//! Goal engine services

mod funnel;
mod goal_service;
mod matcher;
mod stats;
mod visitor_query;

pub use funnel::{
    goal_funnel_steps, parse_funnel_steps, FunnelAnalyzer, FunnelStepCriteria,
    FunnelStepDefinition, VisitorQuery,
};
pub use goal_service::GoalService;
pub use matcher::GoalMatcher;
pub use stats::ConversionStatsService;
pub use visitor_query::EventsVisitorQuery;
