use std::fs;

use anyhow::{Context, Result};
use log::info;

use super::CommandParams;
use crate::ExitCode;
use crate::formatters::rules::{format_rules, log_summary};

/// Fetch the selected lists once and write the rules to the output file
pub(crate) async fn generate(params: CommandParams) -> Result<ExitCode> {
    let CommandParams {
        generator,
        dataset,
        cfg,
    } = params;

    let urls = dataset.urls(&cfg.interest());
    info!("Selected {} of {} dataset rows", urls.len(), dataset.len());

    let rules = generator.generate(urls, cfg.limit).await;
    log_summary(&rules);

    let output = &cfg.output;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create output directory `{}`", parent.display()))?;
    }
    fs::write(output, format_rules(&rules)?)
        .with_context(|| format!("Cannot write rules to `{}`", output.display()))?;

    println!("Generated {} rules -> {}", rules.len(), output.display());
    Ok(ExitCode::Success)
}
