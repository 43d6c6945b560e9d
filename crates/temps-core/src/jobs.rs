use serde::{Deserialize, Serialize};
use std::fmt;

use crate::UtcDateTime;

/// Emitted once per newly stored conversion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalConvertedJob {
    pub goal_id: i32,
    pub goal_name: String,
    pub project_id: i32,
    pub conversion_id: i32,
    pub session_id: Option<String>,
    pub visitor_id: Option<i32>,
    pub value: Option<f64>,
    pub converted_at: UtcDateTime,
}

/// Core job enum containing all possible job types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Job {
    GoalConverted(GoalConvertedJob),
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::GoalConverted(job) => write!(
                f,
                "GoalConverted(goal_id: {}, conversion_id: {}, session: {:?}, value: {:?})",
                job.goal_id, job.conversion_id, job.session_id, job.value
            ),
        }
    }
}

// Core queue abstraction - temps-queue implements this
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to send job: {0}")]
    SendError(String),
    #[error("Failed to receive job: {0}")]
    ReceiveError(String),
    #[error("Queue channel closed")]
    ChannelClosed,
}

/// Core trait for job queue operations
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Send a job to the queue
    async fn send(&self, job: Job) -> Result<(), QueueError>;

    /// Create a new receiver for jobs
    fn subscribe(&self) -> Box<dyn JobReceiver>;
}

/// Core trait for receiving jobs
#[async_trait]
pub trait JobReceiver: Send {
    /// Receive the next job
    async fn recv(&mut self) -> Result<Job, QueueError>;
}
