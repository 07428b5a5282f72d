//! Cached read layer between the HTTP handlers and the upstream API.
//!
//! `queries` holds one function per data need, `cache` the shared
//! freshness/deduplication machinery, and `source` the trait the query
//! functions fetch through.

pub mod cache;
pub mod queries;
pub mod source;

pub use cache::{CachePolicy, QueryCache};
pub use source::NuanceSource;

use std::future::Future;
use std::time::Duration;

/// Runs `refresh` every `interval` on a background task. The first run
/// happens one full interval after spawn, so startup is not blocked on
/// a warm cache.
pub fn spawn_refresh<F, Fut>(interval: Duration, mut refresh: F) -> tokio::task::JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // immediate first tick
        loop {
            ticker.tick().await;
            if let Err(e) = refresh().await {
                tracing::warn!("background refresh failed: {:#}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_spawn_refresh_ticks_on_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = spawn_refresh(Duration::from_secs(60), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0, "no refresh before the first interval");

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert!(count.load(Ordering::SeqCst) >= 3);
        handle.abort();
    }
}
