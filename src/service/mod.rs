//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by the hashtag-bot:
//! - Chat services (e.g., Slack)
//! - Issue trackers (e.g., GitHub)
//! - The in-memory issue store
//!
//! The external services define both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod store;
pub mod tracker;
