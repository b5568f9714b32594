//! Wisdom TUI - Terminal interface for Wisdom Through Time
//!
//! A full-screen renderer over the headless `wisdom-conductor` core: a
//! browse screen for the catalog and a conversation screen for the active
//! session. All behavior lives in the core; this crate maps keys to intents
//! and draws whatever state comes back.
//!
//! # Architecture
//!
//! - **App**: event loop, key handling, screen rendering
//! - **Theme**: the purple/blue palette

pub mod app;
pub mod theme;

pub use app::App;
