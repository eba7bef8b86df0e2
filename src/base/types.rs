use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Tracker types.

/// Lifecycle state of an issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// Snapshot of one tracker item, as it was when last fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub html_url: String,
    pub state: IssueState,
    pub is_pull_request: bool,
    pub author_avatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// One page of a paginated issue listing.
#[derive(Debug, Clone, Default)]
pub struct IssuePage {
    pub items: Vec<IssueRecord>,
    /// The next page to request, or `0` when this was the last page.
    pub next_page: u32,
}

// Chat types.

/// Events surfaced by a chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The transport established its connection.
    Connected,
    /// A plain text message was posted in a channel.
    Message { channel: String, text: String },
    /// The chat credential was rejected.
    InvalidAuth,
    /// The connection is gone and will not come back.
    Disconnected { reason: String },
    /// The transport was asked to shut down (e.g., Ctrl-C).
    Shutdown,
}

/// A transport-neutral rich message card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueMessage {
    /// Plain-text fallback for clients that cannot render the card.
    pub fallback: String,
    pub title: String,
    pub title_link: Option<String>,
    pub text: String,
    /// Hex color of the card's side bar.
    pub color: String,
    pub thumb_url: Option<String>,
    pub footer: String,
    /// Unix timestamp shown next to the footer.
    pub ts: Option<i64>,
}

/// What to do when a mentioned number cannot be resolved even after a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissPolicy {
    /// Post nothing.
    #[default]
    Ignore,
    /// Post a grey "not found" card.
    Notify,
}
