pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::base::types::{ChatEvent, IssueMessage, Res, Void};

// Types.

/// Stream of events coming out of a connected chat transport.
pub type ChatEvents = mpsc::UnboundedReceiver<ChatEvent>;

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the two capabilities the bot needs from a chat platform
/// like Slack: a stream of inbound events and a way to post a card back.
/// Connection management and reconnects are the implementation's business.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Connect to the chat platform.
    ///
    /// Returns the stream of inbound events. The stream yields
    /// `ChatEvent::Connected` once the connection is up, and ends (or yields
    /// `ChatEvent::Disconnected`) when the connection is gone for good.
    async fn connect(&self) -> Res<ChatEvents>;

    /// Post an issue card to a channel.
    async fn send_message(&self, channel_id: &str, message: &IssueMessage) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
