use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::{Client, FetchOutcome, client::Fetch};

/// Default number of concurrent requests, 10.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
/// Ceiling used when a concurrency of zero is requested.
const FALLBACK_MAX_CONCURRENCY: usize = 4;

/// Fetches a batch of URLs with bounded concurrency.
///
/// Admission is controlled by a semaphore with `max_concurrency` permits.
/// Each request holds a permit from the moment it is sent until its outcome
/// has been handed to the consumer, so there are never more than
/// `max_concurrency` requests running or bodies waiting at the same time.
///
/// Note: Although `reqwest` has its own pool,
/// it only limits connections per host, not the total number of
/// requests in flight.
#[derive(Debug)]
pub struct FetchPool<F = Client> {
    fetcher: Arc<F>,
    max_concurrency: usize,
}

impl<F> Clone for FetchPool<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            max_concurrency: self.max_concurrency,
        }
    }
}

impl<F: Fetch + 'static> FetchPool<F> {
    /// Creates a new fetch pool.
    ///
    /// A `max_concurrency` of zero falls back to a ceiling of 4.
    #[must_use]
    pub fn new(fetcher: F, max_concurrency: usize) -> Self {
        let max_concurrency = if max_concurrency == 0 {
            FALLBACK_MAX_CONCURRENCY
        } else {
            max_concurrency
        };
        FetchPool {
            fetcher: Arc::new(fetcher),
            max_concurrency,
        }
    }

    /// The effective concurrency ceiling
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Fetch all `urls` and stream back one [`FetchOutcome`] per submitted
    /// URL, in completion order.
    ///
    /// Once `cancel` fires, no further URLs are submitted. Requests which
    /// are already in flight run to completion and their outcomes are still
    /// delivered. The stream ends after the last in-flight request finished.
    ///
    /// Submission also stops when the returned stream is dropped.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch_all(
        &self,
        urls: Vec<String>,
        cancel: CancellationToken,
    ) -> ReceiverStream<FetchOutcome> {
        let (tx, rx) = mpsc::channel(self.max_concurrency);
        let gate = Arc::new(Semaphore::new(self.max_concurrency));
        let fetcher = Arc::clone(&self.fetcher);

        tokio::spawn(async move {
            let mut tasks = JoinSet::new();

            for url in urls {
                let permit = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("Deadline reached, no further lists are fetched");
                        break;
                    }
                    () = tx.closed() => {
                        debug!("Outcome receiver dropped, no further lists are fetched");
                        break;
                    }
                    permit = Arc::clone(&gate).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        // The gate is never closed while we hold it
                        Err(_) => break,
                    },
                };

                let fetcher = Arc::clone(&fetcher);
                let tx = tx.clone();
                tasks.spawn(async move {
                    debug!("Fetching {url}");
                    let body = fetcher.fetch(&url).await;
                    // The receiver is gone if aggregation finished early
                    let _ = tx.send(FetchOutcome::new(url, body)).await;
                    // Keep the slot until the body is handed over, so at
                    // most `max_concurrency` unsent bodies are held
                    drop(permit);
                });
            }

            // Only the in-flight tasks keep the channel open from here on
            drop(tx);
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    warn!("Fetch task failed: {e}");
                }
            }
        });

        ReceiverStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use rstest::rstest;

    use super::*;
    use crate::{ClientBuilder, ErrorKind, Result};

    /// Records how many fetches run at the same time
    #[derive(Debug, Default)]
    struct Instrumented {
        started: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
        delay: Duration,
    }

    impl Instrumented {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Fetch for Instrumented {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if url.contains("broken") {
                Err(ErrorKind::RejectedStatusCode(StatusCode::INTERNAL_SERVER_ERROR))
            } else {
                Ok(format!("||{}^", url.trim_start_matches("https://")))
            }
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://list{i}.example.com")).collect()
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(10)]
    #[tokio::test(start_paused = true)]
    async fn test_concurrency_bound(#[case] max_concurrency: usize) {
        let pool = FetchPool::new(
            Instrumented::with_delay(Duration::from_millis(10)),
            max_concurrency,
        );
        let outcomes: Vec<_> = pool
            .fetch_all(urls(25), CancellationToken::new())
            .collect()
            .await;

        assert_eq!(outcomes.len(), 25);
        let peak = pool.fetcher.peak.load(Ordering::SeqCst);
        assert!(peak <= max_concurrency, "peak {peak} > {max_concurrency}");
        assert_eq!(peak, max_concurrency);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_concurrency_falls_back() {
        let pool = FetchPool::new(Instrumented::default(), 0);
        assert_eq!(pool.max_concurrency(), 4);

        let outcomes: Vec<_> = pool
            .fetch_all(urls(5), CancellationToken::new())
            .collect()
            .await;
        assert_eq!(outcomes.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_outcome_per_url() {
        let pool = FetchPool::new(Instrumented::default(), 4);
        let mut input = urls(6);
        input.push("https://broken.example.com".to_string());

        let outcomes: Vec<_> = pool
            .fetch_all(input.clone(), CancellationToken::new())
            .collect()
            .await;

        let fetched: HashSet<String> = outcomes.iter().map(|o| o.url.clone()).collect();
        let expected: HashSet<String> = input.into_iter().collect();
        assert_eq!(fetched, expected);
        assert_eq!(outcomes.iter().filter(|o| o.error().is_some()).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let pool = FetchPool::new(Instrumented::default(), 4);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcomes: Vec<_> = pool.fetch_all(urls(10), cancel).collect().await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drains_in_flight() {
        let pool = FetchPool::new(Instrumented::with_delay(Duration::from_millis(50)), 2);
        let cancel = CancellationToken::new();

        let stream = pool.fetch_all(urls(10), cancel.clone());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        });

        // Both admitted requests finish, nothing else gets submitted
        let outcomes: Vec<_> = stream.collect().await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.text().is_some()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_ramp_up() {
        // Fewer URLs than slots, cancellation right away
        let pool = FetchPool::new(Instrumented::with_delay(Duration::from_millis(50)), 8);
        let cancel = CancellationToken::new();
        let stream = pool.fetch_all(urls(3), cancel.clone());
        cancel.cancel();

        let outcomes: Vec<_> = stream.collect().await;
        assert!(outcomes.len() <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_consumer_bounds_fetches() {
        let pool = FetchPool::new(Instrumented::with_delay(Duration::from_millis(10)), 2);

        // Hold the stream without reading from it
        let _outcomes = pool.fetch_all(urls(200), CancellationToken::new());
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Two outcomes fill the channel, two more wait with their slot taken
        let started = pool.fetcher.started.load(Ordering::SeqCst);
        assert!(started <= 4, "{started} fetches started");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_stream_stops_submission() {
        let pool = FetchPool::new(Instrumented::with_delay(Duration::from_millis(10)), 2);

        let mut outcomes = pool.fetch_all(urls(50), CancellationToken::new());
        assert!(outcomes.next().await.is_some());
        drop(outcomes);
        tokio::time::sleep(Duration::from_secs(1)).await;

        let started = pool.fetcher.started.load(Ordering::SeqCst);
        assert!(started <= 4, "{started} fetches started");
        assert_eq!(pool.fetcher.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mixed_statuses_over_http() {
        let ok = test_utils::mock_server!(200, set_body_string("0.0.0.0 ads.example.com"));
        let missing = test_utils::mock_server!(404);
        let pool = FetchPool::new(ClientBuilder::default().client().unwrap(), 2);

        let outcomes: Vec<_> = pool
            .fetch_all(vec![ok.uri(), missing.uri()], CancellationToken::new())
            .collect()
            .await;

        assert_eq!(outcomes.len(), 2);
        for outcome in outcomes {
            if outcome.url == ok.uri() {
                assert_eq!(outcome.body, Ok("0.0.0.0 ads.example.com".to_string()));
            } else {
                assert_eq!(
                    outcome.body,
                    Err(ErrorKind::RejectedStatusCode(StatusCode::NOT_FOUND))
                );
            }
        }
    }
}
