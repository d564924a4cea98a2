//! Whisper-based implementation of the windowed speech pipeline.
//!
//! Decodes long audio in overlapping fixed-length windows and replays each
//! window's decoded segments as the [`DecodeEvent`] stream consumed by a
//! session.

use std::path::Path;

use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperError,
    WhisperState,
};

use crate::{DecodeError, DecodeEvent, DecodeObserver, DecodeOptions, DecodeTask, SpeechPipeline};

/// Shortest audio span, in samples, that the underlying engine accepts for
/// one decode call. Trailing windows shorter than this are zero-padded.
const MIN_DECODE_SAMPLES: usize = crate::SAMPLE_RATE as usize;

/// Pipeline construction failed (missing or corrupt model file, unsupported
/// accelerator configuration, out of memory).
#[derive(Debug, thiserror::Error)]
#[error("failed to construct the speech pipeline: {0}")]
pub struct LoadError(#[from] WhisperError);

/// Windowed Whisper transcription pipeline.
///
/// Holds the inference state for one loaded model. Expects mono `f32`
/// samples at [`crate::SAMPLE_RATE`].
pub struct WhisperPipeline {
    whisper_state: WhisperState,
}

impl WhisperPipeline {
    /// Loads the model at `model_path` and prepares an inference state.
    pub fn load(model_path: &Path, use_accelerator: bool) -> Result<Self, LoadError> {
        let mut context_params = WhisperContextParameters::default();
        context_params.use_gpu(use_accelerator);

        let context =
            WhisperContext::new_with_params(&model_path.to_string_lossy(), context_params)?;
        let whisper_state = context.create_state()?;
        whisper_rs::install_logging_hooks();

        Ok(Self { whisper_state })
    }

    fn build_request_params(options: &DecodeOptions) -> FullParams<'_, 'static> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_special(false);
        params.set_print_timestamps(false);
        params.set_debug_mode(false);

        params.set_no_timestamps(false);
        params.set_token_timestamps(false);
        params.set_single_segment(false);
        params.set_suppress_nst(true);
        params.set_translate(matches!(options.task, DecodeTask::Translate));
        params.set_language(options.language.as_deref());

        params
    }

    /// Replays the decoded segments of the window just processed as ordered
    /// lifecycle events: one `WindowStart`/`WindowEnd` pair around the
    /// window's tokens, skipped entirely when the window produced nothing.
    fn replay_window_events(&mut self, observer: &mut dyn DecodeObserver) {
        let mut opened = false;
        let mut local_end = 0.0f64;

        for segment in self.whisper_state.as_iter() {
            let text = segment.to_str_lossy().unwrap_or_default();
            if text.trim().is_empty() {
                continue;
            }

            if !opened {
                observer.on_event(DecodeEvent::WindowStart {
                    local_start: segment.start_timestamp() as f64 / 100.0,
                });
                opened = true;
            }

            for token_index in 0..segment.n_tokens() {
                let Some(token) = segment.get_token(token_index) else {
                    continue;
                };
                let piece = token.to_str_lossy().unwrap_or_default();
                // Non-speech markers like [_BEG_] and <|endoftext|>.
                if piece.is_empty() || piece.starts_with('[') || piece.starts_with('<') {
                    continue;
                }
                observer.on_event(DecodeEvent::Token {
                    piece: piece.into_owned(),
                });
            }

            local_end = segment.end_timestamp() as f64 / 100.0;
        }

        if opened {
            observer.on_event(DecodeEvent::WindowEnd { local_end });
        }
    }
}

impl SpeechPipeline for WhisperPipeline {
    fn transcribe(
        &mut self,
        audio: &[f32],
        options: &DecodeOptions,
        observer: &mut dyn DecodeObserver,
    ) -> Result<(), DecodeError> {
        if audio.is_empty() {
            return Err(DecodeError::EmptyAudio);
        }

        let window_samples = options.window.window_samples(crate::SAMPLE_RATE);
        let step_samples = options.window.step_samples(crate::SAMPLE_RATE);
        let mut scratch_buffer = Vec::new();

        let mut window_start = 0usize;
        loop {
            let window_end = (window_start + window_samples).min(audio.len());

            // Pad short trailing windows with silence up to the engine's
            // minimum decode length.
            let window: &[f32] = if window_end - window_start >= MIN_DECODE_SAMPLES {
                &audio[window_start..window_end]
            } else {
                scratch_buffer.clear();
                scratch_buffer.extend_from_slice(&audio[window_start..window_end]);
                scratch_buffer.resize(MIN_DECODE_SAMPLES, 0.0);
                &scratch_buffer
            };

            let params = Self::build_request_params(options);
            self.whisper_state.full(params, window)?;

            self.replay_window_events(observer);
            observer.on_event(DecodeEvent::WindowFinalize);

            if window_end == audio.len() {
                break;
            }
            window_start += step_samples;
        }

        Ok(())
    }
}
