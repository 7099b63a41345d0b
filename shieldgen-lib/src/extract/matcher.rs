//! Line matchers for the filter-list syntaxes we understand.
//!
//! Every matcher looks at a single trimmed line and returns at most one
//! domain candidate. Candidates are returned verbatim; normalization happens
//! in the [`Extractor`](super::Extractor).

use std::sync::LazyLock;

use regex::Regex;

/// Hosts-file lines, e.g. `0.0.0.0 ads.example.com`.
/// Anchored to the whole line.
static HOSTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:0\.0\.0\.0|127\.0\.0\.1)\s+([A-Za-z0-9.-]+)$").expect("valid hosts regex")
});

/// Domain anchors, e.g. `||ads.example.com^$script`.
/// May appear anywhere in the line; filter options are ignored.
static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\|([A-Za-z0-9.-]+)\^").expect("valid anchor regex"));

/// Cosmetic filters, e.g. `example.com###banner`. Only the domain prefix
/// is of interest.
static COSMETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9.-]+)###[^#]").expect("valid cosmetic regex"));

/// Anything that looks like a domain: labels and dots, ending in a label of
/// at least two letters.
static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9.-]+\.[A-Za-z]{2,})").expect("valid domain regex")
});

/// A strategy for finding a domain in a single filter-list line
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Attempt a match on `line` and return the raw domain candidate
    fn find<'a>(&self, line: &'a str) -> Option<&'a str>;
}

/// Return the first capture group of `regex` in `line`
fn first_capture<'a>(regex: &Regex, line: &'a str) -> Option<&'a str> {
    regex
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Matches `0.0.0.0 <domain>` and `127.0.0.1 <domain>`
#[derive(Debug, Default, Clone, Copy)]
pub struct HostsMatcher;

impl Matcher for HostsMatcher {
    fn find<'a>(&self, line: &'a str) -> Option<&'a str> {
        first_capture(&HOSTS, line)
    }
}

/// Matches `||<domain>^` anywhere in the line
#[derive(Debug, Default, Clone, Copy)]
pub struct AnchorMatcher;

impl Matcher for AnchorMatcher {
    fn find<'a>(&self, line: &'a str) -> Option<&'a str> {
        first_capture(&ANCHOR, line)
    }
}

/// Matches the `<domain>###...` prefix of cosmetic filters
#[derive(Debug, Default, Clone, Copy)]
pub struct CosmeticMatcher;

impl Matcher for CosmeticMatcher {
    fn find<'a>(&self, line: &'a str) -> Option<&'a str> {
        first_capture(&COSMETIC, line)
    }
}

/// Fallback: the first domain-shaped token of the line
#[derive(Debug, Default, Clone, Copy)]
pub struct DomainMatcher;

impl Matcher for DomainMatcher {
    fn find<'a>(&self, line: &'a str) -> Option<&'a str> {
        first_capture(&DOMAIN, line)
    }
}
