use anyhow::{Context, Result};
use log::info;
use shieldgen_lib::Rule;

/// Number of domains shown when logging a finished run
const SAMPLE_SIZE: usize = 5;

/// Serialize rules the way they are written to disk: a JSON array indented
/// by two spaces
pub(crate) fn format_rules(rules: &[Rule]) -> Result<String> {
    serde_json::to_string_pretty(rules).context("Cannot serialize rules")
}

/// Log the number of rules and the first few blocked domains
pub(crate) fn log_summary(rules: &[Rule]) {
    let sample: Vec<&str> = rules
        .iter()
        .take(SAMPLE_SIZE)
        .map(|rule| rule.condition.url_filter.as_str())
        .collect();
    if sample.is_empty() {
        info!("Generated 0 rules");
    } else {
        info!("Generated {} rules (e.g. {})", rules.len(), sample.join(", "));
    }
}
