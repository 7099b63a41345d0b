use std::fmt::Display;

use crate::{ErrorKind, Result};

/// Result of fetching a single filter list.
///
/// Created once per submitted URL by the [`FetchPool`](crate::FetchPool)
/// and consumed right away by the aggregator.
#[derive(Debug, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The URL which was fetched
    pub url: String,
    /// The (possibly truncated) body, or the reason why there is none
    pub body: Result<String>,
}

impl FetchOutcome {
    #[inline]
    #[must_use]
    /// Create a new outcome
    pub const fn new(url: String, body: Result<String>) -> Self {
        FetchOutcome { url, body }
    }

    #[inline]
    #[must_use]
    /// The body of a successful fetch, if it carries any text.
    ///
    /// Failed fetches and empty bodies both yield `None`.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Ok(body) if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    /// The error of a failed fetch
    pub const fn error(&self) -> Option<&ErrorKind> {
        match &self.body {
            Ok(_) => None,
            Err(e) => Some(e),
        }
    }
}

impl Display for FetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            Ok(body) => write!(f, "{} ({} bytes)", self.url, body.len()),
            Err(e) => write!(f, "{} | {e}", self.url),
        }
    }
}
