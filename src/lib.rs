//! Perpus admin console
//!
//! Headless core of the book catalog admin console: configuration, tracing
//! setup, and the [`App`] that wires the session, the API client and the
//! views together.
//!
//! # Crates
//!
//! - [`storage`] - sled-backed session slot
//! - [`perpus_client`] - HTTP client for the books API
//! - [`app_state`] - list and form view-models, routes
//! - [`app_ui`] - theme context, header and user dropdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod config;

pub use app::{App, AppError};
pub use config::{AppConfig, ConfigError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing(config: &AppConfig) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
