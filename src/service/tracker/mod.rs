//! Issue tracker integration for hashtag-bot.
//!
//! Defines the `GenericTrackerClient` trait that can be implemented for
//! different code-hosting services, with a default implementation for GitHub.

pub mod github;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{IssuePage, Res};

/// Number of items requested per page.
pub const PAGE_SIZE: u32 = 100;

// Traits.

/// Generic "tracker" trait that clients must implement.
#[async_trait]
pub trait GenericTrackerClient: Send + Sync + 'static {
    /// List one page of issues and pull requests (open and closed) for a repository.
    ///
    /// Pages start at `1`. The returned page carries `next_page == 0` once the
    /// upstream has nothing more to give.
    async fn list_issues(&self, owner: &str, repo: &str, page: u32) -> Res<IssuePage>;
}

// Structs.

/// Tracker client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TrackerClient {
    inner: Arc<dyn GenericTrackerClient>,
}

impl Deref for TrackerClient {
    type Target = dyn GenericTrackerClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TrackerClient {
    pub fn new(inner: Arc<dyn GenericTrackerClient>) -> Self {
        Self { inner }
    }
}
