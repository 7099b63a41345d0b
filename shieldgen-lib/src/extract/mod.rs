//! Domain extraction from filter-list text.
//!
//! An [`Extractor`] runs every [`Matcher`] on each line that is not a
//! comment or exception, normalizes the candidates and collects the valid
//! domains into a set.

use std::collections::HashSet;
use std::sync::LazyLock;

mod matcher;

pub use matcher::{AnchorMatcher, CosmeticMatcher, DomainMatcher, HostsMatcher, Matcher};

/// Line prefixes which never contribute domains: comments (`#`, `!`) and
/// allow-list exceptions (`@@`).
const SKIPPED_PREFIXES: [&str; 3] = ["#", "!", "@@"];

/// Shared extractor with the default set of matchers
static DEFAULT_EXTRACTOR: LazyLock<Extractor> = LazyLock::new(Extractor::default);

/// Extracts domains from filter lists written in any of the supported
/// syntaxes: hosts files, domain anchors (`||domain^`), cosmetic filters
/// (`domain###selector`), and a generic fallback for domain-shaped tokens.
///
/// All matchers run on every line; a line can contribute more than one
/// domain.
#[derive(Debug)]
pub struct Extractor {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(HostsMatcher),
            Box::new(AnchorMatcher),
            Box::new(CosmeticMatcher),
            Box::new(DomainMatcher),
        ])
    }
}

impl Extractor {
    /// Creates an extractor which evaluates `matchers` in the given order
    #[must_use]
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Extract the set of normalized domains found in `text`
    #[must_use]
    pub fn extract(&self, text: &str) -> HashSet<String> {
        let mut domains = HashSet::new();
        for line in text.lines().map(str::trim) {
            if is_skipped(line) {
                continue;
            }
            for matcher in &self.matchers {
                if let Some(domain) = matcher.find(line).and_then(normalize) {
                    domains.insert(domain);
                }
            }
        }
        domains
    }
}

/// Extract domains from `text` using the default matchers.
///
/// This is a convenience wrapper around [`Extractor::extract`].
#[must_use]
pub fn extract_domains(text: &str) -> HashSet<String> {
    DEFAULT_EXTRACTOR.extract(text)
}

fn is_skipped(line: &str) -> bool {
    line.is_empty() || SKIPPED_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Lower-case a candidate and drop it if it can't be a public hostname
fn normalize(candidate: &str) -> Option<String> {
    let domain = candidate.to_lowercase();
    if domain.starts_with("localhost") || domain.contains('_') {
        return None;
    }
    Some(domain)
}
