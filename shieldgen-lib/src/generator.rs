use std::time::Duration;

use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::{
    Client, FetchPool, Rule,
    aggregator::aggregate,
    client::Fetch,
    types::build_rules,
};

/// Default overall deadline in seconds for fetching one batch, 120.
pub const DEFAULT_DEADLINE_SECS: u64 = 120;

/// Runs the fetch, extract and aggregate pipeline.
///
/// A generator can be shared between concurrent callers; every call to
/// [`Generator::collect_domains`] uses its own aggregation state and its own
/// deadline.
#[derive(Debug, Clone)]
pub struct Generator<F = Client> {
    pool: FetchPool<F>,
    deadline: Duration,
}

impl<F: Fetch + 'static> Generator<F> {
    /// Create a new generator with the default deadline
    #[must_use]
    pub fn new(pool: FetchPool<F>) -> Self {
        Generator {
            pool,
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
        }
    }

    /// Overall time budget for submitting requests.
    ///
    /// Once it elapses no new requests are started; requests in flight are
    /// still awaited. The budget is independent of the number of URLs.
    #[must_use]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Fetch `urls` and return at most `limit` unique domains in first-seen
    /// order
    pub async fn collect_domains(&self, urls: Vec<String>, limit: usize) -> Vec<String> {
        info!(
            "Fetching {} lists ({} at a time)",
            urls.len(),
            self.pool.max_concurrency()
        );

        let cancel = CancellationToken::new();
        // Stop submitting once we return, even if the deadline hasn't passed
        let _guard = cancel.clone().drop_guard();
        let timer = tokio::spawn({
            let cancel = cancel.clone();
            let deadline = self.deadline;
            async move {
                tokio::time::sleep(deadline).await;
                debug!("Deadline of {deadline:?} elapsed");
                cancel.cancel();
            }
        });

        let outcomes = self.pool.fetch_all(urls, cancel);
        let domains = aggregate(outcomes, limit).await;
        timer.abort();

        info!("Collected {} unique domains", domains.len());
        domains
    }

    /// Fetch `urls` and turn at most `limit` domains into block rules
    pub async fn generate(&self, urls: Vec<String>, limit: usize) -> Vec<Rule> {
        build_rules(&self.collect_domains(urls, limit).await)
    }
}
