//! Core components, types, and utilities for the greeter-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Canned reply templates for mention responses.
//! - Common types and result handling.

pub mod config;
pub mod templates;
pub mod types;
