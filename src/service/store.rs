//! In-memory issue snapshot with per-entry expiration.
//!
//! This is an opinionated concrete implementation; in contrast to the chat and
//! tracker services, it does not expose a generic trait interface.
//!
//! Writes never remove keys that are absent from a new batch. Items that vanish
//! upstream linger until their TTL runs out and the sweeper evicts them.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::RwLock, task::JoinHandle, time::Instant};
use tracing::{debug, instrument};

use crate::base::types::IssueRecord;

/// A cached record and the instant after which it must no longer be served.
#[derive(Debug, Clone)]
struct StoreEntry {
    record: IssueRecord,
    expires_at: Instant,
}

impl StoreEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Issue store for the application.
///
/// It is designed to be trivially cloneable; all clones share one table.
#[derive(Clone)]
pub struct IssueStore {
    entries: Arc<RwLock<HashMap<u64, StoreEntry>>>,
    ttl: Duration,
}

impl IssueStore {
    /// Creates an empty store whose entries live for `ttl` after each write.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Looks up a record by number, ignoring entries that are past their deadline.
    pub async fn get(&self, number: u64) -> Option<IssueRecord> {
        let entries = self.entries.read().await;

        entries.get(&number).filter(|entry| !entry.is_expired(Instant::now())).map(|entry| entry.record.clone())
    }

    /// Writes a batch of records, replacing existing entries and resetting their TTL.
    ///
    /// Keys absent from `records` are left untouched.
    pub async fn put_all<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = IssueRecord>,
    {
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().await;

        let mut count = 0;
        for record in records {
            entries.insert(record.number, StoreEntry { record, expires_at });
            count += 1;
        }

        count
    }

    /// Returns the number of entries currently held, including ones awaiting the sweep.
    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Removes every expired entry and returns how many were evicted.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));

        before - entries.len()
    }

    /// Spawns the background sweeper, which evicts expired entries every `interval`.
    #[instrument(skip(self))]
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let evicted = store.evict_expired().await;
                if evicted > 0 {
                    debug!("Evicted {} expired issues from the cache.", evicted);
                }
            }
        })
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::base::types::IssueState;

    fn record(number: u64, title: &str) -> IssueRecord {
        IssueRecord {
            number,
            title: title.to_string(),
            body: String::new(),
            html_url: format!("https://github.com/octo/repo/issues/{number}"),
            state: IssueState::Open,
            is_pull_request: false,
            author_avatar_url: "https://avatars.example/u/1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_returns_records_until_ttl() {
        let store = IssueStore::new(Duration::from_secs(60));
        store.put_all(vec![record(1, "one"), record(2, "two")]).await;

        assert_eq!(store.get(1).await.unwrap().title, "one");
        assert_eq!(store.get(2).await.unwrap().title, "two");
        assert!(store.get(3).await.is_none());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.get(1).await.is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.get(1).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_all_overwrites_and_keeps_absent_keys() {
        let store = IssueStore::new(Duration::from_secs(60));
        store.put_all(vec![record(1, "old"), record(2, "kept")]).await;

        tokio::time::advance(Duration::from_secs(30)).await;
        store.put_all(vec![record(1, "new")]).await;

        assert_eq!(store.size().await, 2);
        assert_eq!(store.get(1).await.unwrap().title, "new");
        assert_eq!(store.get(2).await.unwrap().title, "kept");

        // Key 2 was not refreshed, so it ages out first.
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(store.get(2).await.is_none());
        assert!(store.get(1).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_all_is_idempotent() {
        let store = IssueStore::new(Duration::from_secs(60));
        let batch = vec![record(1, "one"), record(2, "two")];

        store.put_all(batch.clone()).await;
        store.put_all(batch.clone()).await;

        assert_eq!(store.size().await, 2);
        for expected in batch {
            assert_eq!(store.get(expected.number).await.unwrap(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_expired_entries() {
        let store = IssueStore::new(Duration::from_secs(60));
        store.put_all(vec![record(1, "one")]).await;

        let sweeper = store.spawn_sweeper(Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(store.size().await, 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.size().await, 0);

        sweeper.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_and_writes_do_not_corrupt() {
        let store = IssueStore::new(Duration::from_secs(3600));
        let mut handles = Vec::new();

        for writer in 0..4u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let batch = (1..=100).map(|n| record(n, &format!("title-{n}"))).collect::<Vec<_>>();
                    assert_eq!(store.put_all(batch).await, 100);
                    tokio::task::yield_now().await;
                }
                writer
            }));
        }

        for _ in 0..4 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for n in 1..=100 {
                    if let Some(found) = store.get(n).await {
                        assert_eq!(found.number, n);
                        assert_eq!(found.title, format!("title-{n}"));
                    }
                }
                0
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.size().await, 100);
    }
}
