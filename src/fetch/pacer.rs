// src/fetch/pacer.rs
// =============================================================================
// Polite crawling: keeps a minimum gap between the *start* of consecutive
// requests.
//
// One Pacer is shared (via clone) by every worker in a pass. The lock is held
// while sleeping, so waiters queue up behind each other and the delay limits
// the total request rate against the site, not just the rate of each worker.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Waits until the next request may start.
    pub async fn wait(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                trace!("pacing: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}
