use crate::verbosity::Verbosity;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use const_format::{concatcp, formatcp};
use serde::Deserialize;
use shieldgen_lib::{
    DEFAULT_DEADLINE_SECS, DEFAULT_INTEREST, DEFAULT_LIMIT, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use std::collections::HashSet;
use std::path::Path;
use std::{fs, path::PathBuf, time::Duration};

pub(crate) const SHIELDGEN_CONFIG_FILE: &str = "shieldgen.toml";

const DEFAULT_DATASET: &str = "dataset/Add_Block_data.csv";
const DEFAULT_OUTPUT: &str = "rules/generated_blocklist.json";
const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";

// this exists because clap requires `&str` type values for defaults
// whereas serde expects owned `String` types
// (we can't use e.g. `TIMEOUT` or `timeout()` which gets created for serde)
const LIMIT_STR: &str = concatcp!(DEFAULT_LIMIT);
const MAX_CONCURRENCY_STR: &str = concatcp!(DEFAULT_MAX_CONCURRENCY);
const TIMEOUT_STR: &str = concatcp!(DEFAULT_TIMEOUT_SECS);
const DEADLINE_STR: &str = concatcp!(DEFAULT_DEADLINE_SECS, "s");
// We use a custom help message here because we want to show the default
// value of the config file, but also be able to check if the user has
// provided a custom value. If they didn't, we won't throw an error if
// the file doesn't exist.
const HELP_MSG_CONFIG_FILE: &str = formatcp!(
    "Configuration file to use\n\n[default: {}]",
    SHIELDGEN_CONFIG_FILE,
);

// Macro for generating default functions to be used by serde
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            #[allow(clippy::missing_const_for_fn)]
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    dataset: PathBuf = PathBuf::from(DEFAULT_DATASET);
    output: PathBuf = PathBuf::from(DEFAULT_OUTPUT);
    limit: usize = DEFAULT_LIMIT;
    max_concurrency: usize = DEFAULT_MAX_CONCURRENCY;
    timeout: u64 = DEFAULT_TIMEOUT_SECS;
    deadline: Duration = Duration::from_secs(DEFAULT_DEADLINE_SECS);
    user_agent: String = DEFAULT_USER_AGENT.to_string();
    address: String = DEFAULT_ADDRESS.to_string();
    verbosity: Verbosity = Verbosity::default();
}

// Macro for merging configuration values
macro_rules! fold_in {
    ($cli:ident , $toml:ident ; $ty:ident { $(..$ignore:ident,)* $( $key:ident : $default:expr, )* } ) => {
        if (false) {
            #[allow(dead_code, unused, clippy::diverging_sub_expression)]
            let _check_fold_in_exhaustivity = $ty {
                $($key: unreachable!(), )*
                $($ignore: unreachable!(), )*
            };
        };
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

/// shieldgen fetches public filter lists listed in a dataset, extracts the
/// domains they block and turns them into declarative block rules.
///
/// Without a subcommand, rules are generated once and written to a file.
#[derive(Parser, Debug)]
#[command(version, about, next_display_order = None)]
pub(crate) struct ShieldgenOptions {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,

    /// Configuration file to use
    #[arg(short, long = "config", global = true)]
    #[arg(help = HELP_MSG_CONFIG_FILE)]
    pub(crate) config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) config: Config,
}

/// What to do with the selected lists
#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Command {
    /// Fetch the lists once and write the rules to the output file
    #[default]
    Generate,
    /// Serve freshly generated rules over HTTP
    Serve,
}

/// The main configuration for shieldgen
#[derive(clap::Args, Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Verbose program output
    #[clap(flatten)]
    #[serde(default = "verbosity")]
    pub(crate) verbose: Verbosity,

    /// CSV dataset listing the filter lists
    #[arg(short, long, global = true, default_value = DEFAULT_DATASET)]
    #[serde(default = "dataset")]
    pub(crate) dataset: PathBuf,

    /// File the generated rules are written to
    #[arg(short, long, global = true, default_value = DEFAULT_OUTPUT)]
    #[serde(default = "output")]
    pub(crate) output: PathBuf,

    /// Maximum number of domains (and therefore rules) per run
    #[arg(short, long, global = true, default_value = LIMIT_STR)]
    #[serde(default = "limit")]
    pub(crate) limit: usize,

    /// Maximum number of concurrent list downloads.
    /// Zero falls back to 4.
    #[arg(long, global = true, default_value = MAX_CONCURRENCY_STR, verbatim_doc_comment)]
    #[serde(default = "max_concurrency")]
    pub(crate) max_concurrency: usize,

    /// Number of threads to utilize.
    /// Defaults to number of cores available to the system
    #[arg(short = 'T', long, global = true, verbatim_doc_comment)]
    #[serde(default)]
    pub(crate) threads: Option<usize>,

    /// Website timeout in seconds from connect to response finished
    #[arg(short, long, global = true, default_value = TIMEOUT_STR)]
    #[serde(default = "timeout")]
    pub(crate) timeout: u64,

    /// Overall time budget for starting downloads, e.g. "90s" or "2m".
    /// Downloads already running when it elapses are still awaited.
    #[arg(
        long,
        global = true,
        value_parser = humantime::parse_duration,
        default_value = DEADLINE_STR,
        verbatim_doc_comment
    )]
    #[serde(default = "deadline", with = "humantime_serde")]
    pub(crate) deadline: Duration,

    /// User agent
    #[arg(short, long, global = true, default_value = DEFAULT_USER_AGENT)]
    #[serde(default = "user_agent")]
    pub(crate) user_agent: String,

    /// Tag ids a dataset row needs (at least one of) to be selected.
    /// Defaults to 2, 3 and 6.
    #[arg(long, global = true, value_delimiter = ',', verbatim_doc_comment)]
    #[serde(default)]
    pub(crate) interest: Vec<u32>,

    /// Address the HTTP service listens on
    #[arg(
        short,
        long,
        global = true,
        env = "SHIELDGEN_ADDRESS",
        default_value = DEFAULT_ADDRESS
    )]
    #[serde(default = "address")]
    pub(crate) address: String,
}

impl Config {
    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &Path) -> Result<Config> {
        // Read configuration file
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| "Failed to parse configuration file")
    }

    /// Merge the configuration from TOML into the CLI configuration
    pub(crate) fn merge(&mut self, toml: Config) {
        // NOTE: if you see an error within this macro call, check to make sure that
        // that the fields provided to fold_in! match all the fields of the Config struct.
        fold_in! {
            // Destination and source configs
            self, toml;

            Config {
                // Keys with defaults to assign
                verbose: verbosity(),
                dataset: dataset(),
                output: output(),
                limit: DEFAULT_LIMIT,
                max_concurrency: DEFAULT_MAX_CONCURRENCY,
                threads: None,
                timeout: DEFAULT_TIMEOUT_SECS,
                deadline: deadline(),
                user_agent: user_agent(),
                interest: Vec::<u32>::new(),
                address: address(),
            }
        }
    }

    /// The tag ids used to select dataset rows
    pub(crate) fn interest(&self) -> HashSet<u32> {
        if self.interest.is_empty() {
            DEFAULT_INTEREST.into_iter().collect()
        } else {
            self.interest.iter().copied().collect()
        }
    }
}
