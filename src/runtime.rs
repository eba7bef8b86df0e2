//! Runtime services and shared state for the hashtag-bot.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{dispatch::EventLoop, scheduler, sync::IssueSync},
    service::{chat::ChatClient, store::IssueStore, tracker::TrackerClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the issue store, the tracker and chat clients, and the
/// configuration. It is designed to be trivially cloneable, allowing it to be
/// passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The issue snapshot shared by the scheduler and the event loop.
    pub store: IssueStore,
    /// The issue tracker client instance.
    pub tracker: TrackerClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the issue store.
        let store = IssueStore::new(config.cache_ttl());

        // Initialize the tracker client.
        let tracker = TrackerClient::github(&config)?;

        // Initialize the slack client.
        let chat = ChatClient::slack(&config)?;

        Ok(Self { config, store, tracker, chat })
    }

    /// Run the bot until a fatal event.
    ///
    /// The connection is opened first so that the transport can come up while
    /// the cold-start fetch runs; events queue until the fetch is done.
    pub async fn start(&self) -> Void {
        let sync = IssueSync::new(self.tracker.clone(), self.store.clone());
        let owner = self.config.github_owner.clone();
        let repo = self.config.github_repo.clone();

        let events = self.chat.connect().await?;

        scheduler::cold_start(&sync, &owner, &repo).await?;

        let sweeper = self.store.spawn_sweeper(self.config.cache_sweep_interval());
        let refresher = scheduler::spawn_refresh(sync.clone(), owner, repo, self.config.refresh_interval());

        info!("Listening for issue mentions ...");

        let result = EventLoop::new(self.config.clone(), sync, self.chat.clone()).run(events).await;

        refresher.abort();
        sweeper.abort();

        result
    }
}
