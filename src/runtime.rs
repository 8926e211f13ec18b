//! Runtime services and shared state for the greeter-bot.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::dispatch,
    service::chat::{ChatClient, SessionEvent},
};

/// Queue depth between the session listener and the dispatch worker.
///
/// A full queue delays envelope confirmations, which is the platform's
/// backpressure signal.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// Runtime service context that can be shared across the application.
///
/// This struct holds the chat client and configuration. It is designed to be
/// trivially cloneable, allowing it to be passed around without the need for
/// `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self { config, chat })
    }

    /// Run the session and the dispatch worker until the session ends.
    pub async fn start(&self) -> Void {
        let (events_tx, events_rx) = mpsc::channel::<SessionEvent>(EVENT_QUEUE_CAPACITY);
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(dispatch::run(events_rx, self.chat.clone(), self.config.clone(), cancel.clone()));

        let served = self.chat.start(events_tx).await;

        // The session is over; stop the worker before surfacing the result.
        cancel.cancel();
        worker.await?;

        served
    }
}
