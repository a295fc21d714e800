//! Bounded connection gate with an acquisition timeout.
//!
//! Adapters hold a permit for the whole backend call. Waiting longer than
//! the timeout surfaces [`StorageError::PoolExhausted`] instead of hanging.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::{StorageError, StorageResult};

/// Default number of concurrent backend calls per adapter.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default time to wait for a free slot (5 seconds).
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ConnectionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
    timeout: Duration,
}

impl Default for ConnectionGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY, DEFAULT_ACQUIRE_TIMEOUT)
    }
}

impl ConnectionGate {
    /// A gate admitting `capacity` concurrent calls; zero is raised to one.
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            timeout,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a slot, up to the configured timeout.
    pub async fn acquire(&self) -> StorageResult<OwnedSemaphorePermit> {
        match tokio::time::timeout(self.timeout, self.permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            // Semaphore closed
            Ok(Err(_)) => Err(StorageError::Cancelled),
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, capacity = self.capacity, "connection pool exhausted");
                Err(StorageError::PoolExhausted {
                    waited: self.timeout,
                })
            }
        }
    }

    /// Reject all pending and future acquisitions.
    pub fn close(&self) {
        self.permits.close();
    }
}
