use tokio::sync::broadcast;

use crate::domain::JobChange;

/// Fan-out of job table change events. Delivery is at-least-once and may
/// arrive before the write that caused it is acknowledged.
pub trait JobChangeFeed: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<JobChange>;
}
