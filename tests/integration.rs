#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use greeter_bot::{
    base::{
        config::{Config, ConfigInner},
        templates,
        types::{Res, ReplyAttachment, UserProfile, Void},
    },
    interaction::dispatch,
    service::chat::{ChatClient, EventPayload, GenericChatClient, SessionEvent},
};
use mockall::{Sequence, mock, predicate::eq};
use slack_morphism::prelude::SlackPushEventCallback;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn start(&self, events: mpsc::Sender<SessionEvent>) -> Void;
        async fn ack(&self, request_id: &str) -> Void;
        async fn user_info(&self, user_id: &str) -> Res<UserProfile>;
        async fn post_reply(&self, channel_id: &str, reply: &ReplyAttachment) -> Void;
    }
}

fn profile(display_name: &str, real_name: &str) -> UserProfile {
    UserProfile {
        display_name: display_name.to_string(),
        real_name: real_name.to_string(),
    }
}

/// Helper function to build a test configuration.
fn get_test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            slack_bot_token: "xoxb-test".to_string(),
            slack_app_token: "xapp-test".to_string(),
            reply_channel_id: "C0REPLY".to_string(),
        }),
    }
}

/// Builds a callback session event carrying an app mention.
fn mention_event(event_id: &str, user: &str, text: &str) -> SessionEvent {
    let callback: SlackPushEventCallback = serde_json::from_value(serde_json::json!({
        "team_id": "T0TEST",
        "api_app_id": "A0TEST",
        "event": {
            "type": "app_mention",
            "user": user,
            "text": text,
            "channel": "C0GENERAL",
            "ts": "1234567890.123456",
        },
        "event_id": event_id,
        "event_time": 1234567890,
    }))
    .expect("mention callback should deserialize");

    SessionEvent {
        request_id: event_id.to_string(),
        payload: EventPayload::Callback(callback),
    }
}

/// Builds a callback session event carrying a plain channel message.
fn message_event(event_id: &str) -> SessionEvent {
    let callback: SlackPushEventCallback = serde_json::from_value(serde_json::json!({
        "team_id": "T0TEST",
        "api_app_id": "A0TEST",
        "event": {
            "type": "message",
            "user": "U54321",
            "text": "just chatting",
            "channel": "C0GENERAL",
            "ts": "1234567890.123456",
        },
        "event_id": event_id,
        "event_time": 1234567890,
    }))
    .expect("message callback should deserialize");

    SessionEvent {
        request_id: event_id.to_string(),
        payload: EventPayload::Callback(callback),
    }
}

/// Drive the dispatcher over a fixed set of events until the queue closes.
async fn run_to_completion(chat: MockChat, events: Vec<SessionEvent>) {
    let (events_tx, events_rx) = mpsc::channel(8);

    for event in events {
        events_tx.send(event).await.expect("queue should accept test events");
    }
    drop(events_tx);

    dispatch::run(events_rx, ChatClient::new(Arc::new(chat)), get_test_config(), CancellationToken::new()).await;
}

#[tokio::test]
async fn test_greeting_reply_integration() {
    let mut chat = MockChat::new();
    let mut seq = Sequence::new();

    chat.expect_ack().with(eq("Ev0001")).times(1).in_sequence(&mut seq).returning(|_| Ok(()));
    chat.expect_user_info()
        .with(eq("U54321"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(profile("Alice A", "Alice A")));
    chat.expect_post_reply()
        .withf(|channel_id, reply| {
            channel_id == "C0REPLY"
                && reply.pretext == "Greetings"
                && reply.text == "Hello, Alice A"
                && reply.color == "#4af030"
                && reply.fields.len() == 2
                && reply.fields[0].title == "Date"
                && chrono::DateTime::parse_from_str(&reply.fields[0].value, templates::DATE_FORMAT).is_ok()
                && reply.fields[1].title == "Initializer"
                && reply.fields[1].value == "Alice A"
                && reply.fields[1].short
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    run_to_completion(chat, vec![mention_event("Ev0001", "U54321", "<@U0BOT> hello there")]).await;
}

#[tokio::test]
async fn test_service_offer_reply_integration() {
    let mut chat = MockChat::new();

    chat.expect_ack().with(eq("Ev0002")).times(1).returning(|_| Ok(()));
    chat.expect_user_info().with(eq("U67890")).times(1).returning(|_| Ok(profile("Bob B", "Bob B")));
    chat.expect_post_reply()
        .withf(|channel_id, reply| {
            channel_id == "C0REPLY"
                && reply.pretext == "How can I be of service?"
                && reply.text == "How can I help you Bob B?"
                && reply.color == "#3d3d3d"
                && reply.fields.len() == 2
        })
        .times(1)
        .returning(|_, _| Ok(()));

    run_to_completion(chat, vec![mention_event("Ev0002", "U67890", "<@U0BOT> what is the status")]).await;
}

#[tokio::test]
async fn test_failed_lookup_integration() {
    let mut chat = MockChat::new();

    chat.expect_ack().times(1).returning(|_| Ok(()));
    chat.expect_user_info().with(eq("U0404")).times(1).returning(|_| Err(anyhow::anyhow!("user_not_found")));
    chat.expect_post_reply().never();

    run_to_completion(chat, vec![mention_event("Ev0003", "U0404", "<@U0BOT> hello")]).await;
}

#[tokio::test]
async fn test_non_mention_callback_integration() {
    let mut chat = MockChat::new();

    chat.expect_ack().with(eq("Ev0004")).times(1).returning(|_| Ok(()));
    chat.expect_user_info().never();
    chat.expect_post_reply().never();

    run_to_completion(chat, vec![message_event("Ev0004")]).await;
}

#[tokio::test]
async fn test_unsupported_category_integration() {
    let mut chat = MockChat::new();

    chat.expect_ack().never();
    chat.expect_user_info().never();
    chat.expect_post_reply().never();

    let command = SessionEvent {
        request_id: String::new(),
        payload: EventPayload::Command,
    };
    let interaction = SessionEvent {
        request_id: String::new(),
        payload: EventPayload::Interaction,
    };

    run_to_completion(chat, vec![command, interaction]).await;
}

#[tokio::test]
async fn test_failed_ack_integration() {
    let mut chat = MockChat::new();

    chat.expect_ack().times(1).returning(|_| Err(anyhow::anyhow!("no pending confirmation")));
    chat.expect_user_info().times(1).returning(|_| Ok(profile("Alice A", "Alice A")));
    chat.expect_post_reply().times(1).returning(|_, _| Ok(()));

    run_to_completion(chat, vec![mention_event("Ev0005", "U54321", "<@U0BOT> hello")]).await;
}

#[tokio::test]
async fn test_dispatch_order_integration() {
    let mut chat = MockChat::new();
    let mut seq = Sequence::new();

    chat.expect_ack().with(eq("Ev0006")).times(1).in_sequence(&mut seq).returning(|_| Ok(()));
    chat.expect_user_info().with(eq("U54321")).times(1).in_sequence(&mut seq).returning(|_| Ok(profile("Alice A", "Alice A")));
    chat.expect_post_reply()
        .withf(|_, reply| reply.color == "#4af030")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    chat.expect_ack().with(eq("Ev0007")).times(1).in_sequence(&mut seq).returning(|_| Ok(()));
    chat.expect_user_info().with(eq("U67890")).times(1).in_sequence(&mut seq).returning(|_| Ok(profile("Bob B", "Bob B")));
    chat.expect_post_reply()
        .withf(|_, reply| reply.color == "#3d3d3d")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    run_to_completion(
        chat,
        vec![
            mention_event("Ev0006", "U54321", "<@U0BOT> hello there"),
            mention_event("Ev0007", "U67890", "<@U0BOT> status please"),
        ],
    )
    .await;
}

#[tokio::test]
async fn test_cancellation_integration() {
    let chat = MockChat::new();

    let (events_tx, events_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    cancel.cancel();

    tokio::time::timeout(
        Duration::from_secs(5),
        dispatch::run(events_rx, ChatClient::new(Arc::new(chat)), get_test_config(), cancel),
    )
    .await
    .expect("dispatcher should stop on cancellation");

    // The sender stayed alive, so only cancellation can have stopped the loop.
    drop(events_tx);
}
