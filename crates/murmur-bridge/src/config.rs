use serde::{Deserialize, Serialize};

use crate::model::{ModelPrecision, WhisperModel};

/// Where model weights are downloaded from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelSourceConfig {
    /// Base URL the model file name is appended to.
    pub base_url: String,
}

impl Default for ModelSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/".to_string(),
        }
    }
}

/// Default request parameters, used by front ends when the caller does not
/// specify them explicitly.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptionDefaults {
    /// Model to run when none is requested.
    pub model: WhisperModel,
    /// Weight precision to fetch when none is requested.
    pub precision: ModelPrecision,
    /// Whether to run inference on the GPU when available.
    pub use_accelerator: bool,
    /// Spoken language hint, or `None` to autodetect.
    pub language: Option<String>,
}

impl Default for TranscriptionDefaults {
    fn default() -> Self {
        Self {
            model: WhisperModel::Base,
            precision: ModelPrecision::Quantized8,
            use_accelerator: true,
            language: None,
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Where to fetch model weights from.
    pub model_source: ModelSourceConfig,
    /// Defaults applied to transcription requests.
    pub transcription: TranscriptionDefaults,
}
