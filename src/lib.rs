//! Library root for `hashtag-bot`.
//!
//! Hashtag-bot watches Slack channels for `#123` references and answers each
//! one with a card describing the matching GitHub issue or pull request:
//! - Keeps an in-memory snapshot of every issue in one repository
//! - Refreshes the snapshot at startup, hourly, and on a cache miss
//! - Colors each card by the item's state (open, closed, merged)
//!
//! The bot integrates with Slack for chat and the GitHub REST API for issues.
//! The architecture is built around extensible traits that allow for different
//! implementations of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the hashtag-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the issue store, tracker, and chat clients
/// - Warms the cache and starts the main event loop
pub async fn start(config: Config) -> Void {
    info!("Starting hashtag-bot ...");

    // Start the crypto provider.
    let _ = crypto::ring::default_provider().install_default();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
