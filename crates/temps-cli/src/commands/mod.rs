pub mod args;
pub mod evaluate;
pub mod funnel;
pub mod goal;

pub use evaluate::EvaluateCommand;
pub use funnel::FunnelCommand;
pub use goal::GoalCommand;
