//! Event handling and user interactions for the greeter-bot.
//!
//! This module provides functionality for handling session events:
//! - Dispatching queued events in arrival order
//! - Responding to @-mentions with templated replies

pub mod dispatch;
pub mod mention;
