//! Engine context and message dispatching utilities.
//!
//! The context contains the shared state and provides helpers for sending
//! notifications and results back to the front end bridge.

use std::sync::Arc;

use murmur_bridge::{FailureStage, MessageFromEngine, MessageToEngine};
use murmur_stream::whisper::WhisperPipeline;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::pipeline_cache::PipelineCache;
use crate::services;
use crate::state::SharedState;

/// Shared engine context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Mutable runtime engine state shared across services.
    pub state: SharedState,
    /// The at-most-one live transcription pipeline, checked out by the
    /// currently-running transcription call.
    pub pipelines: Mutex<PipelineCache<WhisperPipeline>>,
    /// Outbound channel to the front end bridge.
    pub tx: Sender<MessageFromEngine>,
}

impl AppContext {
    /// Read and dispatch messages from the front end bridge until it closes.
    ///
    /// Each message is handled to completion before the next one is read,
    /// so at most one transcription is ever in flight; later requests queue
    /// in the channel.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToEngine>) {
        while let Some(message) = rx.recv().await {
            log::debug!("Got a front end message: {message:?}");
            self.dispatch_message(message).await;
        }
    }

    /// Dispatches the received message from the front end down to individual
    /// service handlers.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToEngine) {
        match message {
            MessageToEngine::ConfigurationRequest => {
                services::config_service::handle_config_request(self.clone()).await;
            }
            MessageToEngine::Transcribe(request) => {
                services::transcription_service::handle_transcribe_request(self.clone(), request)
                    .await;
            }
        }
    }

    /// Send a message to the front end bridge.
    pub async fn send(&self, message: MessageFromEngine) {
        self.tx
            .send(message)
            .await
            .expect("failed to send message to front end");
    }

    /// Send message synchronously (blocking) to the front end bridge.
    pub fn send_blocking(&self, message: MessageFromEngine) {
        self.tx
            .blocking_send(message)
            .expect("failed to blocking send message to front end");
    }

    /// Send the terminal failure message for the current run.
    pub async fn send_failure(&self, stage: FailureStage, message: impl Into<String>) {
        self.send(MessageFromEngine::TranscriptionFailed {
            stage,
            message: message.into(),
        })
        .await;
    }
}
