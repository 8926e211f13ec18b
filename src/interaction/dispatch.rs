//! The dispatch worker: drains the session queue one event at a time.

use slack_morphism::prelude::SlackEventCallbackBody;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::{config::Config, types::EventError},
    interaction::mention,
    service::chat::{ChatClient, EventPayload, SessionEvent},
};

/// Consume session events strictly in arrival order until cancelled or the
/// queue closes.
///
/// Per-event errors never stop the loop; a slow event blocks the ones
/// behind it.
#[instrument(skip_all)]
pub async fn run(mut events: mpsc::Receiver<SessionEvent>, chat: ChatClient, config: Config, cancel: CancellationToken) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Dispatcher cancelled; shutting down.");
                break;
            }
            event = events.recv() => match event {
                Some(event) => event,
                None => {
                    info!("Session queue closed; shutting down.");
                    break;
                }
            },
        };

        if let Err(err) = dispatch_event(event, &chat, &config).await {
            match err {
                EventError::TypeMismatch { body } => debug!("Skipping non-mention callback: {}", body),
                err => error!("Error while handling: {}", err),
            }
        }
    }
}

/// Route a single session event.
///
/// Callback deliveries are confirmed before their payload is inspected.
async fn dispatch_event(event: SessionEvent, chat: &ChatClient, config: &Config) -> Result<(), EventError> {
    let SessionEvent { request_id, payload } = event;

    match payload {
        EventPayload::Callback(callback) => {
            if let Err(err) = chat.ack(&request_id).await {
                warn!("Failed to confirm request {}: {}", request_id, err);
            }

            match callback.event {
                SlackEventCallbackBody::AppMention(mention_event) => mention::handle_mention(mention_event, chat, config).await,
                other => Err(EventError::TypeMismatch { body: format!("{other:?}") }),
            }
        }
        EventPayload::Command => Err(EventError::UnsupportedCategory { category: "command".to_string() }),
        EventPayload::Interaction => Err(EventError::UnsupportedCategory { category: "interaction".to_string() }),
    }
}
