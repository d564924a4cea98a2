//! Windowed transcription streaming primitives and STT processing
//! implementations.
//!
//! This crate provides the window sizing table, the decode event contract,
//! and the consumer-side state machine used to turn a windowed, overlapping
//! decode of long audio into one clean transcript. The model processes the
//! audio in fixed-length windows that overlap by a stride; each window
//! reports its lifecycle through [`DecodeEvent`]s, and a
//! [`session::TranscriptionSession`] assembles those events into merged,
//! non-overlapping chunks while the decode is still running.

pub mod chunk;
pub mod merge;
pub mod rate;
pub mod session;
pub mod whisper;

/// Sample rate, in Hz, expected by the speech pipelines in this crate.
///
/// Callers are responsible for downmixing and resampling input audio to
/// mono at this rate before submitting it for transcription.
pub const SAMPLE_RATE: u32 = 16_000;

/// Broad speed/quality grouping of transcription models, used to select
/// window sizing.
///
/// Faster model variants work well with shorter windows, which lowers the
/// latency of the first results; the standard variants use the longer
/// window they were trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Speed-optimized variants; decoded with 20 s windows and a 3 s stride.
    Fast,
    /// Everything else; decoded with 30 s windows and a 5 s stride.
    Standard,
}

/// Window sizing for one transcription run.
///
/// Consecutive windows overlap by `stride_length_s` seconds, so the window
/// starting points advance by `window_length_s - stride_length_s`. The
/// stride must be strictly shorter than the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParams {
    /// Length of one decode window, in seconds.
    pub window_length_s: f64,
    /// Overlap between consecutive windows, in seconds.
    pub stride_length_s: f64,
}

impl WindowParams {
    /// Sizing for the [`ModelFamily::Fast`] models.
    pub const FAST: WindowParams = WindowParams {
        window_length_s: 20.0,
        stride_length_s: 3.0,
    };

    /// Sizing for the [`ModelFamily::Standard`] models.
    pub const STANDARD: WindowParams = WindowParams {
        window_length_s: 30.0,
        stride_length_s: 5.0,
    };

    /// Returns the window sizing for the given model family.
    pub fn for_family(family: ModelFamily) -> Self {
        match family {
            ModelFamily::Fast => Self::FAST,
            ModelFamily::Standard => Self::STANDARD,
        }
    }

    /// Time, in seconds from the start of the full audio, at which the
    /// window with the given index begins.
    pub fn offset_at(&self, window_index: usize) -> f64 {
        (self.window_length_s - self.stride_length_s) * window_index as f64
    }

    /// Number of samples covered by one full window at the given rate.
    pub fn window_samples(&self, sample_rate: u32) -> usize {
        (self.window_length_s * sample_rate as f64) as usize
    }

    /// Number of samples between the starting points of consecutive windows.
    pub fn step_samples(&self, sample_rate: u32) -> usize {
        ((self.window_length_s - self.stride_length_s) * sample_rate as f64) as usize
    }
}

/// Lifecycle events reported by a decode run, in the order the model
/// produces them.
///
/// For every window the pipeline fires `WindowStart`, then zero or more
/// `Token`s, then `WindowEnd`, then exactly one `WindowFinalize`. A window
/// that produced no output skips straight to `WindowFinalize`. Consumers
/// may assume this order; it is not re-verified downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    /// A window began producing output. `local_start` is the start of the
    /// first decoded segment, in seconds relative to the window.
    WindowStart { local_start: f64 },
    /// One decoded text piece, in decode order.
    Token { piece: String },
    /// The window finished producing output. `local_end` is the end of the
    /// last decoded segment, in seconds relative to the window.
    WindowEnd { local_end: f64 },
    /// The window is done and the next one (if any) begins. Fires exactly
    /// once per window, after `WindowEnd`.
    WindowFinalize,
}

/// Receiver for the ordered [`DecodeEvent`] stream of one decode run.
///
/// Events are delivered synchronously from within the decode call, on the
/// thread running it.
pub trait DecodeObserver {
    fn on_event(&mut self, event: DecodeEvent);
}

/// What the model should produce from the spoken audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeTask {
    /// Transcribe in the spoken language.
    Transcribe,
    /// Translate into English while transcribing.
    Translate,
}

/// Per-run decoding parameters supplied by the caller.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Window sizing for this run.
    pub window: WindowParams,
    /// Transcribe or translate.
    pub task: DecodeTask,
    /// Spoken language hint, or `None` to autodetect.
    pub language: Option<String>,
}

/// Errors produced by a windowed decode run.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The submitted audio buffer contains no samples.
    #[error("submitted audio buffer is empty")]
    EmptyAudio,
    /// The underlying inference engine failed while decoding a window.
    #[error("windowed inference failed: {0}")]
    Inference(#[from] whisper_rs::WhisperError),
}

/// A speech-to-text pipeline that decodes a whole audio buffer in
/// overlapping windows.
///
/// Window iteration is internal to the pipeline; callers observe window
/// boundaries only through the events delivered to `observer`. The call is
/// one long-running unit of work with no mid-run cancellation.
pub trait SpeechPipeline {
    fn transcribe(
        &mut self,
        audio: &[f32],
        options: &DecodeOptions,
        observer: &mut dyn DecodeObserver,
    ) -> Result<(), DecodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_offsets_advance_by_window_minus_stride() {
        let params = WindowParams::STANDARD;
        assert_eq!(params.offset_at(0), 0.0);
        assert_eq!(params.offset_at(1), 25.0);
        assert_eq!(params.offset_at(2), 50.0);
    }

    #[test]
    fn family_table_selects_presets() {
        assert_eq!(WindowParams::for_family(ModelFamily::Fast), WindowParams::FAST);
        assert_eq!(
            WindowParams::for_family(ModelFamily::Standard),
            WindowParams::STANDARD
        );
    }

    #[test]
    fn sample_counts_follow_the_rate() {
        let params = WindowParams::FAST;
        assert_eq!(params.window_samples(16_000), 20 * 16_000);
        assert_eq!(params.step_samples(16_000), 17 * 16_000);
    }
}
