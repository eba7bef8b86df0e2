//! Pulls the full issue list of a repository into the issue store.

use anyhow::bail;
use tracing::{info, instrument};

use crate::{
    base::types::Res,
    service::{store::IssueStore, tracker::TrackerClient},
};

/// Copies every issue and pull request of a repository into the store.
///
/// This is the only path that writes to the store. It is trivially cloneable.
#[derive(Clone)]
pub struct IssueSync {
    tracker: TrackerClient,
    store: IssueStore,
}

impl IssueSync {
    pub fn new(tracker: TrackerClient, store: IssueStore) -> Self {
        Self { tracker, store }
    }

    /// The store this sync writes into.
    pub fn store(&self) -> &IssueStore {
        &self.store
    }

    /// Fetch all pages for `owner/repo` and write them into the store.
    ///
    /// Returns how many items were fetched. The first failing page aborts the
    /// fetch; pages written before it stay in the store.
    #[instrument(skip(self))]
    pub async fn fetch(&self, owner: &str, repo: &str) -> Res<usize> {
        if owner.is_empty() || repo.is_empty() {
            bail!("github owner/repo invalid format");
        }

        let mut count = 0;
        let mut page = 1;

        loop {
            let result = self.tracker.list_issues(owner, repo, page).await?;

            count += self.store.put_all(result.items).await;

            if result.next_page == 0 {
                break;
            }

            page = result.next_page;
        }

        info!("{} issues fetched into cache.", count);

        Ok(count)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU32, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::{
        base::types::{IssuePage, IssueRecord, IssueState},
        service::tracker::GenericTrackerClient,
    };

    /// A tracker serving fixed pages, optionally failing on one of them.
    struct PagedTracker {
        pages: Vec<Vec<u64>>,
        fail_on: Option<u32>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl GenericTrackerClient for PagedTracker {
        async fn list_issues(&self, _owner: &str, _repo: &str, page: u32) -> Res<IssuePage> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_on == Some(page) {
                bail!("401 Unauthorized");
            }

            let index = page as usize - 1;
            let items = self.pages[index]
                .iter()
                .map(|&number| IssueRecord {
                    number,
                    title: format!("issue {number}"),
                    body: String::new(),
                    html_url: format!("https://github.com/octo/repo/issues/{number}"),
                    state: IssueState::Open,
                    is_pull_request: false,
                    author_avatar_url: String::new(),
                    created_at: Utc::now(),
                })
                .collect();
            let next_page = if index + 1 < self.pages.len() { page + 1 } else { 0 };

            Ok(IssuePage { items, next_page })
        }
    }

    fn sync_with(tracker: PagedTracker) -> (IssueSync, Arc<PagedTracker>) {
        let tracker = Arc::new(tracker);
        let store = IssueStore::new(Duration::from_secs(3600));
        (IssueSync::new(TrackerClient::new(tracker.clone()), store), tracker)
    }

    #[tokio::test]
    async fn test_fetch_walks_every_page() {
        let (sync, tracker) = sync_with(PagedTracker {
            pages: vec![(1..=100).collect(), (101..=200).collect(), vec![201, 202]],
            fail_on: None,
            calls: AtomicU32::new(0),
        });

        let count = sync.fetch("octo", "repo").await.unwrap();

        assert_eq!(count, 202);
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 3);
        assert_eq!(sync.store().size().await, 202);
        assert_eq!(sync.store().get(150).await.unwrap().title, "issue 150");
    }

    #[tokio::test]
    async fn test_fetch_rejects_empty_identifiers_without_calling_tracker() {
        let (sync, tracker) = sync_with(PagedTracker {
            pages: vec![vec![1]],
            fail_on: None,
            calls: AtomicU32::new(0),
        });

        assert!(sync.fetch("", "repo").await.is_err());
        assert!(sync.fetch("octo", "").await.is_err());
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_aborts_on_first_error() {
        let (sync, tracker) = sync_with(PagedTracker {
            pages: vec![vec![1, 2], vec![3, 4], vec![5]],
            fail_on: Some(2),
            calls: AtomicU32::new(0),
        });

        let err = sync.fetch("octo", "repo").await.unwrap_err();

        assert!(err.to_string().contains("401"));
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 2);
        assert!(sync.store().get(1).await.is_some());
        assert!(sync.store().get(5).await.is_none());
    }
}
