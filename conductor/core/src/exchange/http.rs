//! HTTP Exchange Client
//!
//! Talks to the inference endpoint with a single JSON POST per message.
//!
//! # Wire Format
//!
//! Request:
//!
//! ```json
//! { "figure": { "id": 6, "name": "...", "era": "...", "category": "...", "description": "..." },
//!   "message": "What is time?" }
//! ```
//!
//! Response:
//!
//! ```json
//! { "response": "Time is relative..." }
//! ```
//!
//! Non-2xx statuses, transport errors and bodies without a string
//! `response` field are all reported as [`ExchangeError`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::traits::{ExchangeClient, ExchangeError, ExchangeReply};
use crate::catalog::Figure;
use crate::config::WisdomConfig;

/// Request body sent to the endpoint
#[derive(Clone, Debug, Serialize)]
pub struct ExchangeRequest<'a> {
    /// The figure being addressed, with all catalog fields
    pub figure: &'a Figure,
    /// The user's message, as typed
    pub message: &'a str,
}

/// Response body expected from the endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct ExchangeResponse {
    /// The persona's reply
    pub response: String,
}

/// HTTP exchange client
#[derive(Clone, Debug)]
pub struct HttpExchangeClient {
    /// Endpoint URL, fixed for the life of the client
    endpoint: Url,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpExchangeClient {
    /// Create a client with no request timeout
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create a client whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, ExchangeError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Create from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &WisdomConfig) -> Result<Self, ExchangeError> {
        match config.request_timeout {
            Some(timeout) => Self::with_timeout(config.endpoint.clone(), timeout),
            None => Ok(Self::new(config.endpoint.clone())),
        }
    }

    /// The configured endpoint
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ExchangeClient for HttpExchangeClient {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn send(&self, figure: &Figure, message: &str) -> Result<ExchangeReply, ExchangeError> {
        let request = ExchangeRequest { figure, message };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: ExchangeResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ExchangeError::MalformedResponse(e.to_string()))?;

        Ok(ExchangeReply::new(parsed.response))
    }
}
