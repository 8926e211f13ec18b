//! Library root for `greeter-bot`.
//!
//! Greeter-bot is a small Slack bot that listens for @-mentions over Socket
//! Mode and acknowledges them with a templated reply:
//! - The transport session feeds platform events into an in-memory queue
//! - A single dispatch worker drains the queue in arrival order
//! - Mentions get a canned reply posted to a configured channel
//!
//! The bot integrates with Slack for chat. The architecture is built around
//! an extensible trait that allows for different implementations of the chat
//! service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the greeter-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the chat client
/// - Starts the session and the event dispatch worker
pub async fn start(config: Config) -> Void {
    info!("Starting greeter-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
