use std::sync::Arc;

use temps_core::async_trait::async_trait;
use temps_core::{Job, JobQueue, JobReceiver, QueueError};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

#[derive(Clone)]
pub struct BroadcastQueueService {
    broadcast_sender: broadcast::Sender<Job>,
}

// Wrapper for broadcast::Receiver to implement JobReceiver trait
pub struct BroadcastJobReceiver {
    receiver: broadcast::Receiver<Job>,
}

#[async_trait]
impl JobReceiver for BroadcastJobReceiver {
    async fn recv(&mut self) -> Result<Job, QueueError> {
        let result = self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => {
                error!("Broadcast channel closed");
                QueueError::ChannelClosed
            }
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Receiver lagged by {} messages", n);
                QueueError::ReceiveError(format!("Receiver lagged by {} messages", n))
            }
        });

        if let Ok(job) = &result {
            debug!("Received job: {}", job);
        }

        result
    }
}

#[async_trait]
impl JobQueue for BroadcastQueueService {
    async fn send(&self, job: Job) -> Result<(), QueueError> {
        let subscriber_count = self.broadcast_sender.receiver_count();
        debug!(
            "Broadcasting job {} to {} subscribers",
            job, subscriber_count
        );

        if subscriber_count == 0 {
            warn!("No subscribers listening to broadcast channel, job will be lost: {}", job);
        }

        self.broadcast_sender.send(job.clone()).map_err(|e| {
            error!("Failed to broadcast job {}: {}", job, e);
            QueueError::SendError(format!("Broadcast send failed: {}", e))
        })?;

        Ok(())
    }

    fn subscribe(&self) -> Box<dyn JobReceiver> {
        Box::new(BroadcastJobReceiver {
            receiver: self.broadcast_sender.subscribe(),
        })
    }
}

impl BroadcastQueueService {
    pub fn new(broadcast_sender: broadcast::Sender<Job>) -> Self {
        Self { broadcast_sender }
    }

    pub fn create_broadcast_channel(
        buffer_size: usize,
    ) -> (BroadcastQueueService, broadcast::Receiver<Job>) {
        let (sender, receiver) = broadcast::channel(buffer_size);
        (BroadcastQueueService::new(sender), receiver)
    }

    /// Create a new broadcast queue that implements the JobQueue trait
    /// Returns (queue, keep_alive_receiver) - the receiver must be kept alive!
    pub fn create_job_queue_arc_with_receiver(
        buffer_size: usize,
    ) -> (Arc<dyn JobQueue>, broadcast::Receiver<Job>) {
        let (sender, receiver) = broadcast::channel(buffer_size);
        (Arc::new(BroadcastQueueService::new(sender)), receiver)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Job> {
        self.broadcast_sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use temps_core::GoalConvertedJob;

    fn converted(goal_id: i32) -> GoalConvertedJob {
        GoalConvertedJob {
            goal_id,
            goal_name: "Signup".to_string(),
            project_id: 1,
            conversion_id: 10,
            session_id: Some("sess-1".to_string()),
            visitor_id: Some(7),
            value: Some(49.0),
            converted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_job() {
        let (queue, _keep_alive) = BroadcastQueueService::create_broadcast_channel(10);
        let mut first = JobQueue::subscribe(&queue);
        let mut second = JobQueue::subscribe(&queue);

        queue.send(Job::GoalConverted(converted(3))).await.unwrap();

        for receiver in [&mut first, &mut second] {
            match receiver.recv().await.unwrap() {
                Job::GoalConverted(job) => assert_eq!(job.goal_id, 3),
            }
        }
    }

    #[tokio::test]
    async fn test_send_without_subscribers_fails() {
        let (sender, receiver) = broadcast::channel(4);
        drop(receiver);
        let queue = BroadcastQueueService::new(sender);

        let result = queue.send(Job::GoalConverted(converted(1))).await;
        assert!(matches!(result, Err(QueueError::SendError(_))));
    }

    #[tokio::test]
    async fn test_direct_subscriber_sees_jobs_sent_through_trait() {
        let (queue, _keep_alive) = BroadcastQueueService::create_broadcast_channel(4);
        let mut receiver = queue.subscribe();

        queue.send(Job::GoalConverted(converted(5))).await.unwrap();

        let Job::GoalConverted(job) = receiver.recv().await.unwrap();
        assert_eq!(job.goal_id, 5);
        assert_eq!(job.value, Some(49.0));
    }
}
