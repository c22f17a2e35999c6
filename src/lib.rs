//! fulcrum: terminal client for the Fulcrum project-management API
//!
//! This library provides:
//! - A typed REST client with an error taxonomy (network, 401, 409, detail)
//! - Chat assistant preference sync and model allow-list rules
//! - A remote Coder workspace folder browser
//! - A ratatui dashboard driven by a state reducer
//! - One-shot CLI commands
//! - A network-first offline cache proxy

pub mod api;
pub mod config;
pub mod core;
pub mod offline;
pub mod storage;
pub mod transport;
pub mod tui;
pub mod ui_backend;

pub use api::{ApiError, FulcrumClient};
pub use config::Config;
pub use storage::LocalStore;
