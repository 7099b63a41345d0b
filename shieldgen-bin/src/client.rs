use crate::options::Config;
use anyhow::{Context, Result};
use shieldgen_lib::{Client, ClientBuilder, FetchPool, Generator};
use std::time::Duration;

/// Creates a client according to the command-line config
pub(crate) fn create(cfg: &Config) -> Result<Client> {
    ClientBuilder::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(Duration::from_secs(cfg.timeout))
        .build()
        .client()
        .context("Failed to create request client")
}

/// Creates the fetch, extract and aggregate pipeline around a fresh client
pub(crate) fn generator(cfg: &Config) -> Result<Generator> {
    let pool = FetchPool::new(create(cfg)?, cfg.max_concurrency);
    Ok(Generator::new(pool).deadline(cfg.deadline))
}
