//! The long-lived loop that turns chat events into issue cards.
//!
//! A message mentioning `#N` is resolved against the store. On a miss the loop
//! refreshes the whole store once, synchronously, and tries again; dispatch of
//! later events waits for that refresh.

use anyhow::anyhow;
use tracing::{debug, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{ChatEvent, IssueMessage, IssueRecord, Res, Void},
    },
    service::chat::{ChatClient, ChatEvents},
};

use super::{compose, mention, sync::IssueSync};

/// Dispatches chat events for the lifetime of the process.
///
/// It is trivially cloneable.
#[derive(Clone)]
pub struct EventLoop {
    config: Config,
    sync: IssueSync,
    chat: ChatClient,
}

impl EventLoop {
    pub fn new(config: Config, sync: IssueSync, chat: ChatClient) -> Self {
        Self { config, sync, chat }
    }

    /// Consume events until a fatal one arrives.
    ///
    /// Returns `Ok` only on an orderly shutdown of the transport; every other
    /// way out is an error.
    #[instrument(skip_all)]
    pub async fn run(&self, mut events: ChatEvents) -> Void {
        while let Some(event) = events.recv().await {
            if !self.handle_event(event).await? {
                return Ok(());
            }
        }

        Err(anyhow!("Chat connection closed unexpectedly."))
    }

    /// Handle one event. Returns whether the loop should keep going.
    pub async fn handle_event(&self, event: ChatEvent) -> Res<bool> {
        match event {
            ChatEvent::Connected => {
                info!("Connected!");
                Ok(true)
            }
            ChatEvent::Message { channel, text } => {
                self.handle_message(&channel, &text).await?;
                Ok(true)
            }
            ChatEvent::InvalidAuth => Err(anyhow!("Invalid credentials.")),
            ChatEvent::Disconnected { reason } => Err(anyhow!("Chat connection lost: {}", reason)),
            ChatEvent::Shutdown => {
                info!("Chat connection shut down.");
                Ok(false)
            }
        }
    }

    /// Resolve the first mention in `text` and post its card to `channel`.
    ///
    /// Only a failed send is an error.
    #[instrument(skip(self, text))]
    pub async fn handle_message(&self, channel: &str, text: &str) -> Void {
        let Some(number) = mention::extract_mention(text) else {
            return Ok(());
        };

        let Some(message) = self.card_for(number).await else {
            debug!("Nothing to post for #{}.", number);
            return Ok(());
        };

        self.chat.send_message(channel, &message).await
    }

    async fn card_for(&self, number: u64) -> Option<IssueMessage> {
        match self.resolve(number).await {
            Some(record) => Some(compose::compose_issue_message(&record)),
            None => compose::compose_miss_message(number, self.config.miss_policy),
        }
    }

    /// Look `number` up, refreshing the store once on a miss.
    async fn resolve(&self, number: u64) -> Option<IssueRecord> {
        if let Some(record) = self.sync.store().get(number).await {
            return Some(record);
        }

        info!("#{}: no such item, fetching all issues again ...", number);

        if let Err(err) = self.sync.fetch(&self.config.github_owner, &self.config.github_repo).await {
            warn!("Refresh after a cache miss failed: {}", err);
        }

        self.sync.store().get(number).await
    }
}
