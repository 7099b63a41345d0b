//! `shieldgen` builds browser block rules from public filter lists.
//!
//! A batch of list URLs is fetched with bounded concurrency, every response
//! is scanned for blockable domains, and the first `limit` unique domains
//! are turned into declarative block rules.
//!
//! ```no_run
//! use shieldgen_lib::{ClientBuilder, FetchPool, Generator, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ClientBuilder::default().client()?;
//!     let generator = Generator::new(FetchPool::new(client, 10));
//!     let urls = vec!["https://example.com/hosts.txt".to_string()];
//!     let rules = generator.generate(urls, 400).await;
//!     println!("{} rules", rules.len());
//!     Ok(())
//! }
//! ```
//!
//! Domain extraction is also usable on its own:
//!
//! ```
//! let domains = shieldgen_lib::extract_domains("0.0.0.0 ads.example.com");
//! assert!(domains.contains("ads.example.com"));
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(missing_debug_implementations, unreachable_pub)]

mod aggregator;
mod client;
mod client_pool;
mod generator;
mod types;

pub mod dataset;
pub mod extract;

pub use crate::{
    aggregator::{Aggregator, DEFAULT_LIMIT, aggregate},
    client::{
        Client, ClientBuilder, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, Fetch, MAX_BODY_SIZE,
    },
    client_pool::{DEFAULT_MAX_CONCURRENCY, FetchPool},
    dataset::{DEFAULT_INTEREST, Dataset, DatasetRow},
    extract::{Extractor, extract_domains},
    generator::{DEFAULT_DEADLINE_SECS, Generator},
    types::*,
};

/// Re-exported so callers can cancel a running batch without depending on
/// `tokio-util` themselves
pub use tokio_util::sync::CancellationToken;
