//! Exchange Integration
//!
//! Access to the remote inference endpoint that voices a figure, through a
//! common trait so sessions can be driven by the HTTP client in production
//! and by mocks in tests.
//!
//! # Usage
//!
//! ```ignore
//! use wisdom_conductor::exchange::{ExchangeClient, HttpExchangeClient};
//!
//! let client = HttpExchangeClient::new("https://example.com/api/chat".parse()?);
//! let reply = client.send(&figure, "What is virtue?").await?;
//! println!("{}", reply.response_text);
//! ```

mod http;
mod traits;

pub use http::{ExchangeRequest, ExchangeResponse, HttpExchangeClient};
pub use traits::{ExchangeClient, ExchangeError, ExchangeReply};
