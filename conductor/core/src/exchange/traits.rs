//! Exchange Client Traits
//!
//! The contract between a session and whatever produces a figure's replies.
//! Implementations own their transport details; callers only see a reply or
//! an [`ExchangeError`], and the session layer treats every error the same.

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::Figure;

/// A successful reply from the endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeReply {
    /// The persona's reply text
    pub response_text: String,
}

impl ExchangeReply {
    /// Create a reply
    pub fn new(response_text: impl Into<String>) -> Self {
        Self {
            response_text: response_text.into(),
        }
    }
}

/// Why an exchange failed
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The request never produced a response (connect, DNS, body read, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not JSON or lacked a string `response` field
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The client panicked while handling the request
    #[error("exchange client panicked: {0}")]
    Panicked(String),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Exchange client trait
///
/// One call is one round trip: no retries, no streaming.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Client name for logs (e.g. "HTTP")
    fn name(&self) -> &str;

    /// Send `message` to `figure` and wait for the reply
    async fn send(&self, figure: &Figure, message: &str) -> Result<ExchangeReply, ExchangeError>;
}
