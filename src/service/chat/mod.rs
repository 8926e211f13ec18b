pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use slack_morphism::prelude::SlackPushEventCallback;
use tokio::sync::mpsc;

use crate::base::types::{Res, ReplyAttachment, UserProfile, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the greeter-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Run the transport session.
    ///
    /// Connects to the chat platform and feeds incoming events into the
    /// supplied queue until the session ends or is shut down.
    async fn start(&self, events: mpsc::Sender<SessionEvent>) -> Void;

    /// Confirm receipt of a delivered callback event.
    ///
    /// The platform redelivers events that are never confirmed, so the
    /// dispatcher calls this before acting on a delivery.
    async fn ack(&self, request_id: &str) -> Void;

    /// Look up a user's profile by identifier.
    async fn user_info(&self, user_id: &str) -> Res<UserProfile>;

    /// Post a structured reply to a channel.
    async fn post_reply(&self, channel_id: &str, reply: &ReplyAttachment) -> Void;
}

// Structs.

/// A single delivery from the transport session.
#[derive(Debug)]
pub struct SessionEvent {
    /// Identifier used to confirm receipt of the delivery.
    ///
    /// Empty for categories that carry no confirmation handshake.
    pub request_id: String,
    /// The tagged payload.
    pub payload: EventPayload,
}

/// Top-level event categories the session can yield.
#[derive(Debug)]
pub enum EventPayload {
    /// An Events API callback envelope.
    Callback(SlackPushEventCallback),
    /// A slash command invocation.
    Command,
    /// An interactive component action.
    Interaction,
}

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
