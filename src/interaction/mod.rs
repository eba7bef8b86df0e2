//! Event handling and issue lookups for hashtag-bot.
//!
//! This module provides the behavior built on top of the services:
//! - Finding `#123` mentions in chat text and composing issue cards
//! - Syncing the issue store with the tracker, at boot and on a schedule
//! - The event loop that ties chat, store, and tracker together

pub mod compose;
pub mod dispatch;
pub mod mention;
pub mod scheduler;
pub mod sync;
