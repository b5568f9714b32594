//! Wisdom Conductor - Headless Core for Wisdom Through Time
//!
//! This crate holds everything that has behavior in the application:
//! browsing a catalog of historical figures, filtering it, and holding a
//! conversation with one of them through a remote inference endpoint.
//! It has no UI dependencies and can drive a TUI, a test harness, or any
//! other surface.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       UI Surface (TUI)                        │
//! │        renders ViewState, feeds back the five Intents         │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ Intent (up) / state reads (down)
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                     ViewStateMachine                          │
//! │   ┌──────────────────────┐        ┌────────────────────────┐  │
//! │   │  Browse              │        │  Conversation          │  │
//! │   │  Catalog+FilterIndex │──sel──▶│  SessionController     │  │
//! │   │                      │◀─back──│          │             │  │
//! │   └──────────────────────┘        └──────────┼─────────────┘  │
//! │                                              │ ExchangeTicket │
//! │                                   ┌──────────▼─────────────┐  │
//! │                                   │  ExchangeClient (HTTP) │  │
//! │                                   └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Catalog`]: immutable registry of [`Figure`]s
//! - [`FilterIndex`]: search text + category over the catalog
//! - [`ExchangeClient`]: async boundary to the inference endpoint
//! - [`SessionController`]: the active conversation and its pending flag
//! - [`ViewStateMachine`]: Browse / Conversation and the intents that move between them
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use wisdom_conductor::{Catalog, HttpExchangeClient, Intent, ViewStateMachine, load_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let client = Arc::new(HttpExchangeClient::from_config(&config)?);
//!     let mut view = ViewStateMachine::new(Catalog::builtin(), client);
//!
//!     view.handle_intent(Intent::SetSearchQuery("einstein".into()))?;
//!     let id = view.results()[0].id;
//!     view.handle_intent(Intent::SelectEntity(id))?;
//!     view.handle_intent(Intent::SendMessage("What is time?".into()))?;
//!
//!     // Wait for the reply to land in the session log
//!     view.settle().await;
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`catalog`]: the figure registry
//! - [`filter`]: the pure filter function and its memoized index
//! - [`messages`]: message and identifier types
//! - [`exchange`]: exchange client trait and HTTP transport
//! - [`session`]: conversation state and the send workflow
//! - [`view`]: the top-level mode state machine
//! - [`events`]: intents fed back from the surface
//! - [`config`]: TOML/env configuration loading

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod events;
pub mod exchange;
pub mod filter;
pub mod messages;
pub mod session;
pub mod view;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogError, Figure, FigureId};
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with, parse_endpoint,
    ConfigError, ConfigOverrides, ConfigSource, WisdomConfig, WisdomToml,
};
pub use events::Intent;
pub use exchange::{
    ExchangeClient, ExchangeError, ExchangeReply, ExchangeRequest, HttpExchangeClient,
};
pub use filter::{filter, CategoryFilter, FilterIndex, ALL_CATEGORIES};
pub use messages::{Message, Sender, SessionId};
pub use session::{
    render_greeting, ExchangeOutcome, ExchangeTicket, RejectReason, SendOutcome,
    SessionController, FALLBACK_MESSAGE,
};
pub use view::{TransitionError, ViewState, ViewStateMachine};
