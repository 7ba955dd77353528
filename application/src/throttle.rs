//! Oracle-wide request throttle
//!
//! One semaphore shared by every oracle call of a run. A call waits for a
//! permit before its attempt starts, so time spent queued is never charged
//! to the per-call timeout.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps oracle requests in flight across all items and agents
#[derive(Debug, Clone)]
pub struct OracleThrottle {
    slots: Arc<Semaphore>,
}

impl OracleThrottle {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Wait for a free slot. `None` only if the throttle was closed.
    pub async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.slots).acquire_owned().await.ok()
    }

    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}
