//! Core components, types, and utilities for the hashtag-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Issue, chat event, and message card types.
//! - Common types and result handling.

pub mod config;
pub mod types;
