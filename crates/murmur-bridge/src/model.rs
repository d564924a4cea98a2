//! Transcription model identity and the mapping to downloadable weights.

use std::str::FromStr;

use murmur_stream::ModelFamily;
use serde::{Deserialize, Serialize};

/// Available Whisper transcription models for download and local inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
    LargeTurbo,
    Large,
}

/// Numeric precision variant of a model's weights.
///
/// Quantized variants trade accuracy for a smaller download and lower
/// memory use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelPrecision {
    /// Unquantized weights.
    Full,
    /// 8-bit quantization.
    #[serde(rename = "q8")]
    Quantized8,
    /// 5-bit quantization.
    #[serde(rename = "q5")]
    Quantized5,
}

impl WhisperModel {
    /// Window sizing family for this model. The turbo variant is the
    /// speed-optimized one; everything else decodes with the standard
    /// window.
    pub fn family(&self) -> ModelFamily {
        match self {
            WhisperModel::LargeTurbo => ModelFamily::Fast,
            _ => ModelFamily::Standard,
        }
    }

    /// File name of the ggml weights for this model at the given precision.
    pub fn file_name(&self, precision: ModelPrecision) -> &'static str {
        match (self, precision) {
            (WhisperModel::Tiny, ModelPrecision::Full) => "ggml-tiny.bin",
            (WhisperModel::Tiny, ModelPrecision::Quantized8) => "ggml-tiny-q8_0.bin",
            (WhisperModel::Tiny, ModelPrecision::Quantized5) => "ggml-tiny-q5_1.bin",
            (WhisperModel::Base, ModelPrecision::Full) => "ggml-base.bin",
            (WhisperModel::Base, ModelPrecision::Quantized8) => "ggml-base-q8_0.bin",
            (WhisperModel::Base, ModelPrecision::Quantized5) => "ggml-base-q5_1.bin",
            (WhisperModel::Small, ModelPrecision::Full) => "ggml-small.bin",
            (WhisperModel::Small, ModelPrecision::Quantized8) => "ggml-small-q8_0.bin",
            (WhisperModel::Small, ModelPrecision::Quantized5) => "ggml-small-q5_1.bin",
            (WhisperModel::Medium, ModelPrecision::Full) => "ggml-medium.bin",
            (WhisperModel::Medium, ModelPrecision::Quantized8) => "ggml-medium-q8_0.bin",
            (WhisperModel::Medium, ModelPrecision::Quantized5) => "ggml-medium-q5_0.bin",
            (WhisperModel::LargeTurbo, ModelPrecision::Full) => "ggml-large-v3-turbo.bin",
            (WhisperModel::LargeTurbo, ModelPrecision::Quantized8) => {
                "ggml-large-v3-turbo-q8_0.bin"
            }
            (WhisperModel::LargeTurbo, ModelPrecision::Quantized5) => {
                "ggml-large-v3-turbo-q5_0.bin"
            }
            (WhisperModel::Large, ModelPrecision::Full) => "ggml-large-v3.bin",
            // No q8 build is published for large-v3; q5 is the closest.
            (WhisperModel::Large, ModelPrecision::Quantized8) => "ggml-large-v3-q5_0.bin",
            (WhisperModel::Large, ModelPrecision::Quantized5) => "ggml-large-v3-q5_0.bin",
        }
    }
}

impl FromStr for WhisperModel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "small" => Ok(WhisperModel::Small),
            "medium" => Ok(WhisperModel::Medium),
            "large-turbo" => Ok(WhisperModel::LargeTurbo),
            "large" => Ok(WhisperModel::Large),
            other => Err(format!("unknown model name: {other}")),
        }
    }
}

impl FromStr for ModelPrecision {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "full" => Ok(ModelPrecision::Full),
            "q8" => Ok(ModelPrecision::Quantized8),
            "q5" => Ok(ModelPrecision::Quantized5),
            other => Err(format!("unknown precision tag: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turbo_is_the_fast_family() {
        assert_eq!(WhisperModel::LargeTurbo.family(), ModelFamily::Fast);
        assert_eq!(WhisperModel::Base.family(), ModelFamily::Standard);
    }

    #[test]
    fn file_names_follow_the_published_naming() {
        assert_eq!(
            WhisperModel::Base.file_name(ModelPrecision::Quantized8),
            "ggml-base-q8_0.bin"
        );
        assert_eq!(
            WhisperModel::LargeTurbo.file_name(ModelPrecision::Full),
            "ggml-large-v3-turbo.bin"
        );
    }
}
