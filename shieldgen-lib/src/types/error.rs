use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Possible errors when interacting with `shieldgen_lib`
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Network error while trying to connect to an endpoint via reqwest
    #[error("Network error: {0}")]
    NetworkRequest(#[source] reqwest::Error),

    /// Cannot read the body of the received response
    #[error("Error reading response body: {0}")]
    ReadResponseBody(#[source] reqwest::Error),

    /// The network client required for fetching cannot be created
    #[error("Error creating request client: {0}")]
    BuildRequestClient(#[source] reqwest::Error),

    /// The given header could not be parsed.
    /// A possible error when converting a `HeaderValue` from a string or byte
    /// slice.
    #[error("Header could not be parsed: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The request did not finish within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The remote answered with a status code outside of the 2xx range
    #[error("Rejected status code: {0}")]
    RejectedStatusCode(StatusCode),

    /// The dataset could not be opened or read
    #[error("Cannot read dataset `{}`: {}", .0.display(), .1)]
    Dataset(PathBuf, #[source] csv::Error),

    /// Any other form of I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorKind {
    /// Map a `reqwest::Error` raised while sending a request to the matching
    /// [`ErrorKind`]. Timeouts get their own variant.
    #[must_use]
    pub(crate) fn from_request_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::NetworkRequest(e)
        }
    }

    /// Same as [`ErrorKind::from_request_error`] for errors raised while
    /// streaming a response body.
    #[must_use]
    pub(crate) fn from_body_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::ReadResponseBody(e)
        }
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NetworkRequest(e1), Self::NetworkRequest(e2))
            | (Self::ReadResponseBody(e1), Self::ReadResponseBody(e2))
            | (Self::BuildRequestClient(e1), Self::BuildRequestClient(e2)) => {
                e1.to_string() == e2.to_string()
            }
            (Self::RejectedStatusCode(c1), Self::RejectedStatusCode(c2)) => c1 == c2,
            (Self::Dataset(p1, e1), Self::Dataset(p2, e2)) => {
                p1 == p2 && e1.to_string() == e2.to_string()
            }
            (Self::Io(e1), Self::Io(e2)) => e1.kind() == e2.kind(),
            (Self::InvalidHeader(_), Self::InvalidHeader(_)) | (Self::Timeout, Self::Timeout) => {
                true
            }
            _ => false,
        }
    }
}

impl Eq for ErrorKind {}
