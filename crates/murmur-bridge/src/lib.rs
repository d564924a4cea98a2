//! Communication bridge between the front end and the transcription engine.
//!
//! This crate defines the types and protocols used to connect a caller (a
//! CLI, a UI, a test harness) with the asynchronous engine responsible for
//! model management and windowed transcription.
//!
//! The design is deliberately lightweight and unidirectional:
//! - The front end sends commands (transcribe this audio, request config).
//! - The engine pushes events (loader progress, per-token transcript
//!   updates, the terminal result or failure).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`], providing back-pressure, async compatibility, and
//! clean separation of concerns. The engine processes one request at a
//! time; requests sent while one is in flight queue behind it.

pub mod config;
pub mod load;
pub mod model;

use tokio::sync::mpsc::{self, Receiver, Sender};

pub use murmur_stream::DecodeTask;
pub use murmur_stream::chunk::TranscriptionResult;
pub use murmur_stream::session::LiveUpdate;

use crate::model::{ModelPrecision, WhisperModel};

/// One transcription job, fully described.
///
/// `audio` must be mono `f32` samples at [`murmur_stream::SAMPLE_RATE`].
#[derive(Clone)]
pub struct TranscribeRequest {
    /// Raw audio samples to transcribe.
    pub audio: Vec<f32>,
    /// Which model to run.
    pub model: WhisperModel,
    /// Numeric precision variant of the model weights.
    pub precision: ModelPrecision,
    /// Whether to run inference on the GPU when available.
    pub use_accelerator: bool,
    /// Transcribe or translate.
    pub task: DecodeTask,
    /// Spoken language hint, or `None` to autodetect.
    pub language: Option<String>,
}

impl std::fmt::Debug for TranscribeRequest {
    /// Reports the audio buffer by length rather than contents.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscribeRequest")
            .field("audio_samples", &self.audio.len())
            .field("model", &self.model)
            .field("precision", &self.precision)
            .field("use_accelerator", &self.use_accelerator)
            .field("task", &self.task)
            .field("language", &self.language)
            .finish()
    }
}

/// Which phase of a transcription run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Fetching or constructing the model pipeline failed; nothing was
    /// cached.
    Load,
    /// The windowed inference call itself failed; partial chunks are
    /// discarded.
    Decode,
}

/// Messages emitted by the engine to inform the front end of state updates.
///
/// For one transcription request the engine emits zero or more
/// `LoadProgress` messages, then one `TranscriptionUpdate` per decoded
/// token, then exactly one of `TranscriptionComplete` or
/// `TranscriptionFailed`. Nothing follows the terminal message for that
/// run.
#[derive(Debug, Clone)]
pub enum MessageFromEngine {
    /// Response to the configuration request from the front end.
    ConfigurationResponse(config::Config),
    /// Model loading progress, forwarded for display only.
    LoadProgress(load::LoadEvent),
    /// Best-effort transcript snapshot, one per decoded token.
    TranscriptionUpdate(LiveUpdate),
    /// Terminal success: the final merged transcript.
    TranscriptionComplete(TranscriptionResult),
    /// Terminal failure for this run.
    TranscriptionFailed {
        stage: FailureStage,
        message: String,
    },
}

/// Commands issued by the front end to control or query the engine.
#[derive(Debug, Clone)]
pub enum MessageToEngine {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Request to transcribe one audio buffer.
    Transcribe(TranscribeRequest),
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// the front end and the engine.
pub struct BridgeChannels {
    /// Receiver used by the front end to get messages from the engine.
    pub frontend_rx: Receiver<MessageFromEngine>,
    /// Sender used by the front end to send commands to the engine.
    pub frontend_tx: Sender<MessageToEngine>,

    /// Receiver used by the engine to get commands from the front end.
    pub engine_rx: Receiver<MessageToEngine>,
    /// Sender used by the engine to send events/responses to the front end.
    pub engine_tx: Sender<MessageFromEngine>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_engine_tx, to_engine_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_engine_tx,
            frontend_rx: to_frontend_rx,
            engine_rx: to_engine_rx,
            engine_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
