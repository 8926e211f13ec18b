//! Slack implementation of the chat service.
//!
//! This module runs the Socket Mode session for the bot:
//! - Receiving platform events and feeding them into the session queue
//! - Holding delivery envelopes open until the dispatcher confirms them
//! - Looking up user profiles
//! - Posting reply attachments

use std::{collections::HashMap, ops::Deref, sync::Arc};

use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{info, instrument, warn};

use crate::base::{
    config::Config,
    types::{Res, ReplyAttachment, UserProfile, Void},
};

use super::{ChatClient, EventPayload, GenericChatClient, SessionEvent};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    events: mpsc::Sender<SessionEvent>,
    acks: PendingAcks,
}

/// Pending delivery confirmations keyed by request ID.
///
/// A push callback registers its delivery here and then waits on the gate,
/// which keeps the Socket Mode envelope open until the dispatcher confirms
/// receipt.
#[derive(Clone, Default)]
struct PendingAcks {
    inner: Arc<Mutex<HashMap<String, oneshot::Sender<()>>>>,
}

impl PendingAcks {
    /// Register a delivery and return the gate its envelope waits on.
    async fn register(&self, request_id: &str) -> oneshot::Receiver<()> {
        let (confirmed_tx, confirmed_rx) = oneshot::channel();
        self.inner.lock().await.insert(request_id.to_string(), confirmed_tx);
        confirmed_rx
    }

    /// Drop a registration without confirming it, failing its gate.
    async fn forget(&self, request_id: &str) {
        self.inner.lock().await.remove(request_id);
    }

    /// Confirm a delivery, releasing its envelope.
    async fn complete(&self, request_id: &str) -> Void {
        let sender = self
            .inner
            .lock()
            .await
            .remove(request_id)
            .ok_or_else(|| anyhow::anyhow!("No pending confirmation for request {}", request_id))?;

        sender
            .send(())
            .map_err(|_| anyhow::anyhow!("Confirmation receiver for request {} is gone", request_id))?;

        Ok(())
    }
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub client: Arc<FullClient>,
    pub acks: PendingAcks,
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
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Validate the bot token and announce the bot's identity before the
        // socket connects.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;

        info!("Slack bot user ID: {}", bot_user.user_id.0);

        Ok(Self {
            app_token,
            bot_token,
            client,
            acks: PendingAcks::default(),
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn start(&self, events: mpsc::Sender<SessionEvent>) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            events,
            acks: self.acks.clone(),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events.
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn ack(&self, request_id: &str) -> Void {
        self.acks.complete(request_id).await
    }

    #[instrument(skip(self))]
    async fn user_info(&self, user_id: &str) -> Res<UserProfile> {
        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        let session = self.open_session(&self.bot_token);

        let response = session.users_info(&request).await.map_err(|e| anyhow::anyhow!("Failed to look up user {}: {}", user_id, e))?;

        Ok(resolve_profile(&response.user))
    }

    #[instrument(skip(self))]
    async fn post_reply(&self, channel_id: &str, reply: &ReplyAttachment) -> Void {
        let fields = reply
            .fields
            .iter()
            .map(|field| {
                SlackMessageAttachmentFieldObject::new()
                    .with_title(field.title.clone())
                    .with_value(field.value.clone())
                    .with_short(field.short)
            })
            .collect();

        let attachment = SlackMessageAttachment::new()
            .with_color(reply.color.clone())
            .with_fallback(reply.text.clone())
            .with_text(reply.text.clone())
            .with_fields(fields);

        // The attachment model here has no pretext slot; the pretext rides
        // as the message text above the attachment.
        let message = SlackMessageContent::new().with_text(reply.pretext.clone()).with_attachments(vec![attachment]);

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message);

        let session = self.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to post reply: {}", e))?;

        Ok(())
    }
}

/// Resolve the names a reply needs, skipping the fields Slack may leave
/// blank.
fn resolve_profile(user: &SlackUser) -> UserProfile {
    let username = non_blank(user.name.as_deref());
    let profile_display = non_blank(user.profile.as_ref().and_then(|p| p.display_name.as_deref()));
    let profile_real = non_blank(user.profile.as_ref().and_then(|p| p.real_name.as_deref()));

    let display_name = profile_display.or(profile_real).or(username).unwrap_or_default().to_string();
    let real_name = profile_real.or(profile_display).or(username).unwrap_or_default().to_string();

    UserProfile { display_name, real_name }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);

    enqueue_marker(&states, EventPayload::Command).await?;

    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are currently supported.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);

    enqueue_marker(&states, EventPayload::Interaction).await
}

/// Handles push events from Slack.
///
/// The envelope stays open until the dispatcher confirms the delivery, so
/// anything that never reaches the worker gets redelivered by the platform.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (events, acks) = {
        let states = states.read().await;
        let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;
        (user_state.events.clone(), user_state.acks.clone())
    };

    let request_id = event_callback.event_id.0.clone();
    let gate = acks.register(&request_id).await;

    let event = SessionEvent {
        request_id: request_id.clone(),
        payload: EventPayload::Callback(event_callback),
    };

    if let Err(err) = events.send(event).await {
        acks.forget(&request_id).await;
        return Err(anyhow::anyhow!("Failed to queue push event: {}", err).into());
    }

    gate.await.map_err(|_| anyhow::anyhow!("Confirmation for request {} was dropped", request_id))?;

    Ok(())
}

/// Queues a non-callback category so the dispatcher can account for it.
async fn enqueue_marker(states: &SlackClientEventsUserState, payload: EventPayload) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let events = {
        let states = states.read().await;
        let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;
        user_state.events.clone()
    };

    let event = SessionEvent {
        request_id: String::new(),
        payload,
    };

    events.send(event).await.map_err(|e| anyhow::anyhow!("Failed to queue event: {}", e))?;

    Ok(())
}

// Tests.
