//! Logging and tracing utilities.
//!
//! This module provides helpers for setting up structured logging using the
//! `tracing` ecosystem. All logs are written to **stderr** so they never mix
//! with output the orchestrating tool reads from the provider.
//!
//! # Quick Start
//!
//! ```ignore
//! use rmon_provider::init_logging;
//!
//! fn main() {
//!     // Initialize logging (reads RUST_LOG env var)
//!     init_logging();
//!     tracing::info!("starting rmon provider");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `debug`, `rmon_provider=debug`)
//!
//! # Examples
//!
//! ```bash
//! # Show info logs (default)
//! RUST_LOG=info ./my-provider
//!
//! # Show debug logs for the provider core
//! RUST_LOG=rmon_provider=debug ./my-provider
//!
//! # Show all debug logs
//! RUST_LOG=debug ./my-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the default logging subscriber.
///
/// This sets up a `tracing` subscriber that:
/// - Writes to **stderr**
/// - Respects the `RUST_LOG` environment variable for filtering
/// - Defaults to `info` level if `RUST_LOG` is not set
/// - Uses a compact, human-readable format
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

/// Initialize logging with a custom default level.
///
/// Like [`init_logging`], but allows specifying a default log level
/// that will be used if `RUST_LOG` is not set.
///
/// # Arguments
///
/// * `default_level` - The default log level (e.g., "debug", "info", "warn")
pub fn init_logging_with_default(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this function does not panic if a subscriber
/// has already been set. This is useful in test scenarios or when
/// the provider might be initialized multiple times.
///
/// # Returns
///
/// - `true` if the subscriber was successfully set
/// - `false` if a subscriber was already set
pub fn try_init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}
