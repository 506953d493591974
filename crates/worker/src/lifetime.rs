//! Lifetime extension for asynchronous side effects.
//!
//! A hosting environment may tear the worker down as soon as an event
//! handler returns. Side effects that outlive the response (cache writes,
//! background refreshes, deletions) are registered with [`ExtendLifetime`]
//! and handed to the host alongside the outcome; the host awaits
//! [`ExtendLifetime::settle`] after replying. Dropping an unsettled lifetime
//! aborts its tasks.

use std::future::Future;

use tokio::task::JoinSet;

/// Pending side effects of one event.
#[derive(Default)]
pub struct ExtendLifetime {
    tasks: JoinSet<()>,
}

impl ExtendLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the event alive until `effect` completes.
    pub fn wait_until<F>(&mut self, effect: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(effect);
    }

    /// Number of effects not yet joined.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every registered effect. Returns how many completed.
    pub async fn settle(mut self) -> usize {
        let mut completed = 0;
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(()) => completed += 1,
                Err(e) => tracing::warn!("lifetime-extended task failed: {e}"),
            }
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_settle_waits_for_all_effects() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut lifetime = ExtendLifetime::new();
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            lifetime.wait_until(async move {
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(lifetime.pending(), 3);

        assert_eq!(lifetime.settle().await, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_settle_empty() {
        assert_eq!(ExtendLifetime::new().settle().await, 0);
    }

    #[tokio::test]
    async fn test_panicking_effect_does_not_poison_settle() {
        let mut lifetime = ExtendLifetime::new();
        lifetime.wait_until(async { panic!("boom") });
        lifetime.wait_until(async {});
        assert_eq!(lifetime.settle().await, 1);
    }
}
