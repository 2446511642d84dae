//! RequestPool - bounded concurrency for remote calls
//!
//! At most `capacity` remote requests run at once. Extra requests wait for a
//! permit instead of failing.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Default number of in-flight remote requests
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

#[derive(Clone)]
pub struct RequestPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl RequestPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Run `fut` on a background task once a permit is available
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = self.permits.clone();
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::debug!("Request pool closed, dropping request");
                    return;
                }
            };
            fut.await;
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Requests currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }
}

impl Default for RequestPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IN_FLIGHT)
    }
}
