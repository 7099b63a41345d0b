use std::collections::HashSet;

use futures::{Stream, StreamExt};
use log::debug;

use crate::{FetchOutcome, extract::extract_domains};

/// Default maximum number of domains per run, 400.
pub const DEFAULT_LIMIT: usize = 400;

/// Aggregator keeps the state of domain collection for a single run
///
/// Domains are kept in the order they are first seen. Each run must use its
/// own aggregator; nothing is shared between runs.
#[derive(Debug, Clone)]
pub struct Aggregator {
    limit: usize,
    seen: HashSet<String>,
    domains: Vec<String>,
}

impl Aggregator {
    /// Create a new aggregator which keeps at most `limit` domains
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Aggregator {
            limit,
            seen: HashSet::new(),
            domains: Vec::new(),
        }
    }

    /// Returns `true` once `limit` domains have been collected
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.domains.len() >= self.limit
    }

    /// Merge the domains of a single outcome.
    ///
    /// Failed fetches and empty bodies contribute nothing. Domains of one
    /// document are merged in sorted order.
    pub fn add(&mut self, outcome: &FetchOutcome) {
        let Some(text) = outcome.text() else {
            debug!("Skipping {outcome}");
            return;
        };

        let mut found: Vec<String> = extract_domains(text).into_iter().collect();
        found.sort_unstable();
        debug!("Found {} domains in {outcome}", found.len());

        for domain in found {
            if self.is_full() {
                break;
            }
            if self.seen.insert(domain.clone()) {
                self.domains.push(domain);
            }
        }
    }

    /// The domains collected so far, in first-seen order
    #[must_use]
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Consume the aggregator and return the collected domains
    #[must_use]
    pub fn into_domains(self) -> Vec<String> {
        self.domains
    }
}

/// Drain `outcomes` into a deduplicated, first-seen ordered list of at most
/// `limit` domains.
///
/// Stops pulling from the stream as soon as the limit is reached.
pub async fn aggregate<S>(outcomes: S, limit: usize) -> Vec<String>
where
    S: Stream<Item = FetchOutcome>,
{
    let mut aggregator = Aggregator::new(limit);
    if aggregator.is_full() {
        return aggregator.into_domains();
    }

    let mut outcomes = std::pin::pin!(outcomes);
    while let Some(outcome) = outcomes.next().await {
        aggregator.add(&outcome);
        if aggregator.is_full() {
            debug!("Reached limit of {limit} domains");
            break;
        }
    }
    aggregator.into_domains()
}
