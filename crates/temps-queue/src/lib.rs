//! Implementation of job queue using tokio channels
//! This crate implements the JobQueue trait from temps-core using tokio's
//! broadcast channel, so every subscriber (alerting, dashboards) sees every job.

pub mod queue;

pub use queue::*;

// Re-export core traits for convenience
pub use temps_core::{Job, JobQueue, JobReceiver, QueueError};
