//! HTTP side of filter-list fetching.
//!
//! This module defines the [`Fetch`] trait, which abstracts over "get me the
//! text behind this URL", and [`Client`], its `reqwest`-backed
//! implementation. [`ClientBuilder`] exposes the knobs for building a
//! `Client`.
#![allow(clippy::module_name_repetitions)]
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{self, HeaderMap, HeaderValue};
use typed_builder::TypedBuilder;

use crate::{ErrorKind, Result};

/// Default timeout in seconds before a request is deemed as failed, 12.
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
/// Hard cap for the number of body bytes read per response, 2 MiB.
/// Anything beyond is silently dropped.
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;
/// Default user agent, `shieldgen-<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("shieldgen/", env!("CARGO_PKG_VERSION"));

/// Something that can retrieve the text of a filter list
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the body behind `url`.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the body cannot be retrieved, including non-2xx
    /// status codes.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Builder for [`Client`].
///
/// See crate-level documentation for usage example.
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
pub struct ClientBuilder {
    /// User-agent sent with every request.
    ///
    /// Some list mirrors reject requests without a user agent.
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    user_agent: String,
    /// Timeout per request, covering connect, headers and body.
    #[builder(default = Duration::from_secs(DEFAULT_TIMEOUT_SECS))]
    timeout: Duration,
    /// Maximum number of body bytes kept per response.
    #[builder(default = MAX_BODY_SIZE)]
    max_body_size: usize,
}

impl Default for ClientBuilder {
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientBuilder {
    /// Instantiates a [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The user-agent is invalid.
    /// - The request client cannot be created.
    ///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
    pub fn client(self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&self.user_agent).map_err(ErrorKind::InvalidHeader)?,
        );

        let reqwest_client = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(ErrorKind::BuildRequestClient)?;

        Ok(Client {
            reqwest_client,
            max_body_size: self.max_body_size,
        })
    }
}

/// Fetches filter lists over HTTP.
///
/// See [`ClientBuilder`] which contains sane defaults for all configuration options.
#[derive(Debug, Clone)]
pub struct Client {
    /// Underlying `reqwest` client instance that handles the HTTP requests.
    reqwest_client: reqwest::Client,
    /// Maximum number of body bytes kept per response.
    max_body_size: usize,
}

#[async_trait]
impl Fetch for Client {
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut response = self
            .reqwest_client
            .get(url)
            .send()
            .await
            .map_err(ErrorKind::from_request_error)?;

        // Dropping the response releases the connection, so an early return
        // here never leaves an unread body behind.
        let status = response.status();
        if !status.is_success() {
            return Err(ErrorKind::RejectedStatusCode(status));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(ErrorKind::from_body_error)? {
            let remaining = self.max_body_size - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                debug!("Truncated body of {url} at {} bytes", self.max_body_size);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        // A cut may land inside a multi-byte sequence
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
