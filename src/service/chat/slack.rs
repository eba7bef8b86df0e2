//! Slack integration for hashtag-bot.
//!
//! This module connects to Slack in socket mode and forwards inbound messages
//! as `ChatEvent`s, and posts issue cards back as Block Kit attachments.

use crate::base::{
    config::Config,
    types::{ChatEvent, IssueMessage, Res, Void},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use reqwest::Url;
use slack_morphism::{errors::SlackClientError, prelude::*};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, ChatEvents, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Longest text Slack accepts in a section block.
const SECTION_TEXT_LIMIT: usize = 3000;

/// Slack API error codes that mean the credential itself is unusable.
const AUTH_ERROR_CODES: &[&str] = &["invalid_auth", "not_authed", "account_inactive", "token_revoked"];

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    events: mpsc::UnboundedSender<ChatEvent>,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    app_token: SlackApiToken,
    bot_token: SlackApiToken,
    username: String,
    icon_emoji: String,
    client: Arc<FullClient>,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        Ok(Self {
            app_token,
            bot_token,
            username: config.bot_username.clone(),
            icon_emoji: config.bot_icon_emoji.clone(),
            client,
        })
    }

    /// Run the socket mode listener until it stops, reporting its lifecycle as events.
    #[instrument(name = "SlackChatClient::listen", skip_all)]
    async fn listen(self, events: mpsc::UnboundedSender<ChatEvent>) {
        // Check the bot token before anything else.

        let session = self.client.open_session(&self.bot_token);
        match session.auth_test().await {
            Ok(bot_user) => info!("Slack bot user ID: {}", bot_user.user_id.0),
            Err(e) => {
                let _ = events.send(connection_error_event(e));
                return;
            }
        }

        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState { events: events.clone() }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events.
        if let Err(e) = socket_mode_listener.listen_for(&self.app_token).await {
            let _ = events.send(connection_error_event(e));
            return;
        }

        let _ = events.send(ChatEvent::Connected);

        // Start WS connections and wait for Ctrl-C to shutdown.
        // Reconnects within a session are handled by the listener itself.
        socket_mode_listener.serve().await;

        let _ = events.send(ChatEvent::Shutdown);
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn connect(&self) -> Res<ChatEvents> {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(self.clone().listen(tx));

        Ok(rx)
    }

    #[instrument(skip(self, message))]
    async fn send_message(&self, channel_id: &str, message: &IssueMessage) -> Void {
        let content = SlackMessageContent::new().with_text(escape_mrkdwn(&message.fallback)).with_attachments(vec![to_attachment(message)]);

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), content)
            .with_username(self.username.clone())
            .with_icon_emoji(self.icon_emoji.clone());

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Helpers.

/// Map a Slack client failure onto the event that ends the connection.
fn connection_error_event(error: SlackClientError) -> ChatEvent {
    if let SlackClientError::ApiError(ae) = &error
        && AUTH_ERROR_CODES.contains(&ae.code.as_str())
    {
        return ChatEvent::InvalidAuth;
    }

    ChatEvent::Disconnected { reason: error.to_string() }
}

/// Render an issue card as a Slack attachment.
///
/// The attachment keeps the legacy color bar and fallback; the card itself is a
/// section block (linked title, body, avatar accessory) followed by a context
/// block with the footer and creation date.
fn to_attachment(message: &IssueMessage) -> SlackMessageAttachment {
    let title = match &message.title_link {
        Some(link) => format!("*<{}|{}>*", link, escape_mrkdwn(&message.title)),
        None => format!("*{}*", escape_mrkdwn(&message.title)),
    };

    let text = if message.text.is_empty() {
        title
    } else {
        clip(&format!("{}\n{}", title, escape_mrkdwn(&message.text)), SECTION_TEXT_LIMIT)
    };

    let mut section = SlackSectionBlock::new().with_text(SlackBlockMarkDownText::new(text).into());

    if let Some(thumb_url) = &message.thumb_url {
        match Url::parse(thumb_url) {
            Ok(image_url) => {
                let image = SlackBlockImageElement::new(SlackImageUrlOrFile::ImageUrl { image_url }, "author avatar".to_string());
                section = section.with_accessory(image.into());
            }
            Err(e) => debug!("Skipping unparsable avatar URL `{}`: {}", thumb_url, e),
        }
    }

    let footer = match message.ts {
        Some(ts) => format!("{} | <!date^{}^{{date_short}}|{}>", escape_mrkdwn(&message.footer), ts, ts),
        None => escape_mrkdwn(&message.footer),
    };

    let context = SlackContextBlock::new(vec![SlackBlockMarkDownText::new(footer).into()]);

    SlackMessageAttachment::new()
        .with_color(message.color.clone())
        .with_fallback(message.fallback.clone())
        .with_blocks(vec![section.into(), context.into()])
}

/// Escape the characters Slack treats as control sequences in mrkdwn.
fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Cut `text` to at most `limit` characters, marking the cut with an ellipsis.
fn clip(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut clipped: String = text.chars().take(limit - 1).collect();
    clipped.push('…');
    clipped
}

/// Whether a message event was posted by a bot (our own cards included).
fn is_from_bot(event: &SlackMessageEvent) -> bool {
    event.sender.bot_id.is_some() || matches!(event.subtype, Some(SlackMessageEventType::BotMessage))
}

// Socket mode listener callbacks for Slack.

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            // Never react to bots, including our own cards.
            if is_from_bot(&slack_message_event) {
                debug!("Skipping message event from a bot.");
                return Ok(());
            }

            let Some(channel) = slack_message_event.origin.channel.as_ref().map(|c| c.0.to_owned()) else {
                warn!("Skipping message event without a channel.");
                return Ok(());
            };

            let Some(text) = slack_message_event.content.as_ref().and_then(|c| c.text.clone()) else {
                debug!("Skipping message event without text.");
                return Ok(());
            };

            if user_state.events.send(ChatEvent::Message { channel, text }).is_err() {
                error!("Dropping message event because the event loop has stopped.");
            }
        }
        _ => {
            debug!("Received unhandled push event.")
        }
    }

    Ok(())
}

// Tests.
