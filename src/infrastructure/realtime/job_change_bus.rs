use tokio::sync::broadcast;

use crate::application::ports::JobChangeFeed;
use crate::domain::JobChange;

const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out of job changes. Slow subscribers see `Lagged` and are
/// expected to resynchronise from the store.
pub struct JobChangeBus {
    sender: broadcast::Sender<JobChange>,
}

impl JobChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, change: JobChange) {
        tracing::debug!(kind = %change.kind, job_id = %change.job_id, "Job change");
        // Nobody listening is not an error.
        let _ = self.sender.send(change);
    }
}

impl Default for JobChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl JobChangeFeed for JobChangeBus {
    fn subscribe(&self) -> broadcast::Receiver<JobChange> {
        self.sender.subscribe()
    }
}
