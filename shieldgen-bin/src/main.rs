//! `shieldgen` turns public filter lists into browser block rules.
//!
//! The binary is a wrapper around shieldgen-lib. It reads a CSV dataset of
//! filter lists, fetches the lists that carry one of the selected tags and
//! writes one block rule per extracted domain.
//!
//! Generate rules once (the default):
//! ```sh
//! shieldgen --dataset dataset/Add_Block_data.csv --output rules/blocklist.json
//! ```
//!
//! Serve rules over HTTP:
//! ```sh
//! shieldgen serve --address 127.0.0.1:8080
//! curl 'http://127.0.0.1:8080/generate?limit=50'
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, crate_version};
use formatters::log::init_logging;
use log::{error, info};
use shieldgen_lib::Dataset;

mod client;
mod commands;
mod formatters;
mod options;
mod verbosity;

use crate::{
    commands::CommandParams,
    options::{Command, SHIELDGEN_CONFIG_FILE, ShieldgenOptions},
};

/// A C-like enum that can be cast to `i32` and used as process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    // NOTE: exit code 1 is used for any `Result::Err` bubbled up to `main()`
    // using the `?` operator, e.g. an unreadable dataset or a failed bind.
    #[allow(unused)]
    UnexpectedFailure = 1,
    ConfigFile = 3,
}

fn main() -> Result<()> {
    // std::process::exit doesn't guarantee that all destructors will be run,
    // therefore we wrap the main code in another function to ensure that.
    // See: https://doc.rust-lang.org/stable/std/process/fn.exit.html
    let exit_code = run_main()?;
    std::process::exit(exit_code);
}

/// Merge all provided config options into one.
/// This includes a potential config file, command-line- and environment variables
fn load_config() -> Result<ShieldgenOptions> {
    let mut opts = ShieldgenOptions::parse();

    init_logging(&opts.config.verbose);

    // Load a potentially existing config file and merge it into the config from
    // the CLI
    if let Some(config_file) = &opts.config_file {
        match options::Config::load_from_file(config_file) {
            Ok(c) => opts.config.merge(c),
            Err(e) => {
                bail!(
                    "Cannot load configuration file `{}`: {e:?}",
                    config_file.display()
                );
            }
        }
    } else {
        // Without an explicit `--config`, the default file is optional. It
        // is still an error if it exists but is invalid.
        let default_config = PathBuf::from(SHIELDGEN_CONFIG_FILE);
        if default_config.is_file() {
            match options::Config::load_from_file(&default_config) {
                Ok(c) => opts.config.merge(c),
                Err(e) => {
                    bail!(
                        "Cannot load default configuration file `{}`: {e:?}",
                        default_config.display()
                    );
                }
            }
        }
    }

    Ok(opts)
}

/// Set up runtime and call the shieldgen entrypoint
fn run_main() -> Result<i32> {
    use std::process::exit;

    let opts = match load_config() {
        Ok(opts) => opts,
        Err(e) => {
            error!(
                "Error while loading config: {e}\n\
                shieldgen {} reads `{SHIELDGEN_CONFIG_FILE}` from the working directory by default",
                crate_version!()
            );
            exit(ExitCode::ConfigFile as i32);
        }
    };

    let runtime = match opts.config.threads {
        Some(threads) => {
            // We define our own runtime instead of the `tokio::main` attribute
            // since we want to make the number of threads configurable
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(threads)
                .enable_all()
                .build()?
        }
        None => tokio::runtime::Runtime::new()?,
    };

    runtime.block_on(run(&opts))
}

/// Run shieldgen with the given options
async fn run(opts: &ShieldgenOptions) -> Result<i32> {
    let cfg = &opts.config;

    // The dataset is loaded before anything else, so that a missing dataset
    // fails fast, also before the service binds its port
    let dataset = Dataset::from_path(&cfg.dataset)
        .with_context(|| format!("Cannot load dataset from `{}`", cfg.dataset.display()))?;
    info!("Loaded {} dataset rows", dataset.len());

    let params = CommandParams {
        generator: client::generator(cfg)?,
        dataset,
        cfg: cfg.clone(),
    };

    let exit_code = match opts.command.unwrap_or_default() {
        Command::Generate => commands::generate(params).await?,
        Command::Serve => commands::serve(params).await?,
    };

    Ok(exit_code as i32)
}
