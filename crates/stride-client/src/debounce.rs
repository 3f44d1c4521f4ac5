//! Delay-then-run helper for search-as-you-type.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use stride_shared::constants::SEARCH_DEBOUNCE_MS;

/// Runs the most recent scheduled job after `delay`; scheduling a new job
/// cancels the pending one.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Debouncer tuned for search-as-you-type.
    pub fn for_search() -> Self {
        Self::new(Duration::from_millis(SEARCH_DEBOUNCE_MS))
    }

    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
