use rubato::{FftFixedInOut, Resampler, ResamplerConstructionError};

/// Internal FFT block size used when resampling whole buffers.
const BUFFER_RESAMPLE_BLOCK_SIZE: u32 = 1024;

/// Errors that can occur during audio resampling.
#[derive(Debug, thiserror::Error)]
pub enum ResamplerError {
    /// The resampler could not be constructed for the given rate pair.
    #[error("failed to construct resampler: {0}")]
    ConstructionError(#[from] ResamplerConstructionError),
    /// Failed to resample the provided audio samples.
    ///
    /// This error is returned when the underlying resampling engine
    /// encounters a failure while processing input samples.
    #[error("failed to resample input samples: {0}")]
    ResampleError(#[from] rubato::ResampleError),
}

/// Audio stream resampler trait.
///
/// This trait defines a common interface for resampling a continuous audio
/// stream. Implementations consume input samples and deliver resampled
/// output through a user-provided callback.
pub trait AudioResampler<T: rubato::Sample>: Send {
    /// Process an input audio buffer and emit resampled output via a callback.
    ///
    /// The input slice contains mono audio samples (single channel,
    /// non-interleaved). Implementations may consume all or only part of the
    /// input immediately, depending on their internal buffering strategy.
    ///
    /// The provided callback is invoked zero or more times with contiguous
    /// slices of resampled output data.
    ///
    /// # Returns
    /// Returns the total number of output samples written during this call.
    ///
    /// # Errors
    /// Returns [`ResamplerError`] if resampling fails.
    fn process_callback(
        &mut self,
        input: &[T],
        callback: &mut dyn FnMut(&[T]),
    ) -> Result<usize, ResamplerError>;
}

/// FFT-based streaming resampler for arbitrary input and output block sizes.
///
/// This resampler accepts input buffers of unpredictable sizes, including
/// partial audio frames. It internally buffers incoming samples in a FIFO
/// queue and feeds the resampling engine whenever enough data is available.
/// Output samples are produced as soon as possible and delivered via the
/// callback.
pub struct StreamingResampler<T: rubato::Sample> {
    resampler: FftFixedInOut<T>,
    frames_queue: std::collections::VecDeque<T>,

    input_buffer: Vec<T>,
    output_buffer: Vec<T>,
}

impl<T: rubato::Sample> StreamingResampler<T> {
    /// Creates a new FFT-based streaming resampler for mono audio.
    ///
    /// Any number of input samples may be provided per processing call,
    /// including zero or partial frames. The `block_size` parameter controls
    /// the internal FFT processing size and therefore affects latency and
    /// performance, but it does not impose any constraints on the public
    /// API.
    ///
    /// This function performs internal memory allocations and should be
    /// called during initialization, not from a real-time audio thread.
    ///
    /// # Errors
    /// Returns [`ResamplerConstructionError`] if the resampler cannot be
    /// constructed with the given parameters.
    pub fn new(
        original_rate: u32,
        target_rate: u32,
        block_size: u32,
    ) -> Result<Self, ResamplerConstructionError> {
        let resampler = FftFixedInOut::new(
            original_rate as usize,
            target_rate as usize,
            block_size as usize,
            1, // we're using mono
        )?;

        let raw_input_buffer = resampler.input_buffer_allocate(true);
        let raw_output_buffer = resampler.output_buffer_allocate(true);

        Ok(Self {
            frames_queue: std::collections::VecDeque::new(),
            input_buffer: raw_input_buffer[0].clone(),
            output_buffer: raw_output_buffer[0].clone(),
            resampler,
        })
    }

    /// Number of input samples the next processing step will consume.
    ///
    /// Feeding this many zero samples flushes whatever is left in the
    /// internal queue through the engine.
    pub fn input_block_len(&self) -> usize {
        self.resampler.input_frames_next()
    }
}

impl<T: rubato::Sample> AudioResampler<T> for StreamingResampler<T> {
    fn process_callback(
        &mut self,
        input: &[T],
        callback: &mut dyn FnMut(&[T]),
    ) -> Result<usize, ResamplerError> {
        let mut total_written = 0usize;
        self.frames_queue.extend(input);

        loop {
            let wanted_len = self.resampler.input_frames_next();
            if self.frames_queue.len() < wanted_len {
                break;
            }

            if self.input_buffer.len() != wanted_len {
                self.input_buffer.resize(wanted_len, T::zero());
            }

            for i in 0..wanted_len {
                let frame_value = self
                    .frames_queue
                    .pop_front()
                    .expect("failed to pop a frame value");
                self.input_buffer[i] = frame_value;
            }

            let input_buffer = &[&self.input_buffer];
            let output_buffer = &mut [&mut self.output_buffer];
            let (_, output_written) =
                self.resampler
                    .process_into_buffer(input_buffer, output_buffer, None)?;

            // don't call callback if nothing was written
            if output_written > 0 {
                callback(&self.output_buffer[..output_written]);
                total_written += output_written;
            }
        }

        Ok(total_written)
    }
}

/// Resamples a whole mono buffer to the target rate.
///
/// Intended for offline file preparation. The tail of the input is flushed
/// with silence, so the output may carry up to one block of trailing
/// near-zero samples.
pub fn resample_buffer(
    input: &[f32],
    original_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, ResamplerError> {
    if original_rate == target_rate {
        return Ok(input.to_vec());
    }

    let mut resampler =
        StreamingResampler::<f32>::new(original_rate, target_rate, BUFFER_RESAMPLE_BLOCK_SIZE)?;

    let ratio = target_rate as f64 / original_rate as f64;
    let mut output = Vec::with_capacity((input.len() as f64 * ratio) as usize + 1);

    {
        let mut sink = |written_data: &[f32]| output.extend_from_slice(written_data);
        resampler.process_callback(input, &mut sink)?;

        let flush = vec![0.0f32; resampler.input_block_len()];
        resampler.process_callback(&flush, &mut sink)?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_rates_pass_the_buffer_through() {
        let input: Vec<f32> = (0..100).map(|i| (i as f32).sin()).collect();
        let output = resample_buffer(&input, 16_000, 16_000).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn downsampling_shrinks_by_the_rate_ratio() {
        let input = vec![0.0f32; 48_000];
        let output = resample_buffer(&input, 48_000, 16_000).unwrap();

        // One second of input makes roughly one second of output, give or
        // take the flush block.
        let expected = 16_000usize;
        assert!(
            output.len() >= expected && output.len() <= expected + 2048,
            "unexpected output length {}",
            output.len()
        );
    }

    #[test]
    fn upsampling_grows_by_the_rate_ratio() {
        let input = vec![0.0f32; 8_000];
        let output = resample_buffer(&input, 8_000, 16_000).unwrap();

        let expected = 16_000usize;
        assert!(
            output.len() >= expected && output.len() <= expected + 4096,
            "unexpected output length {}",
            output.len()
        );
    }
}
