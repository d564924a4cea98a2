use log::info;
use murmur_bridge::load::LoadEvent;
use murmur_bridge::{FailureStage, MessageFromEngine, TranscribeRequest};
use murmur_stream::session::TranscriptionSession;
use murmur_stream::whisper::WhisperPipeline;
use murmur_stream::{DecodeOptions, SpeechPipeline, WindowParams};

use crate::pipeline_cache::PipelineKey;

/// Errors that can occur while bringing up the transcription pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineLoadError {
    /// Fetching the model weights failed.
    #[error(transparent)]
    Fetch(#[from] super::model_service::ModelFetchError),
    /// The inference engine rejected the model or configuration.
    #[error(transparent)]
    Construction(#[from] murmur_stream::whisper::LoadError),
}

/// Handles an incoming transcription request (see
/// [`murmur_bridge::MessageToEngine::Transcribe`]).
///
/// One run walks through: pipeline checkout (constructing and caching a new
/// instance when the requested configuration differs from the cached one),
/// windowed decode with per-token updates, then exactly one terminal
/// completion or failure message.
pub async fn handle_transcribe_request(context: super::AppContextHandle, request: TranscribeRequest) {
    let key = PipelineKey {
        task: request.task,
        model: request.model,
        precision: request.precision,
        use_accelerator: request.use_accelerator,
    };

    let cached = context.pipelines.lock().await.take_matching(&key);

    let pipeline = match cached {
        Some(pipeline) => pipeline,
        None => {
            info!("Loading transcription pipeline for {key:?}");
            match load_pipeline(&context, &key).await {
                Ok(pipeline) => pipeline,
                Err(error) => {
                    log::error!("Failed to load the transcription pipeline: {error}");
                    context
                        .send_failure(FailureStage::Load, error.to_string())
                        .await;
                    return;
                }
            }
        }
    };

    let window = WindowParams::for_family(request.model.family());
    info!(
        "Transcribing {} samples with {:?} (window {:.0} s, stride {:.0} s).",
        request.audio.len(),
        request.model,
        window.window_length_s,
        window.stride_length_s,
    );

    let options = DecodeOptions {
        window,
        task: request.task,
        language: request.language,
    };
    let audio = request.audio;
    let update_context = context.clone();

    let (pipeline, outcome) = tokio::task::spawn_blocking(move || {
        let mut pipeline = pipeline;
        let mut session = TranscriptionSession::new(window, |update| {
            update_context.send_blocking(MessageFromEngine::TranscriptionUpdate(update));
        });

        let outcome = pipeline.transcribe(&audio, &options, &mut session);
        (pipeline, outcome.map(|()| session.finish()))
    })
    .await
    .expect("transcription task panicked");

    // The instance survives a decode failure; keep it for the next run.
    context.pipelines.lock().await.store(key, pipeline);

    match outcome {
        Ok(result) => {
            info!(
                "Transcription complete: {} merged chunks, {:?} tokens/s.",
                result.chunks.len(),
                result.tokens_per_second,
            );
            context
                .send(MessageFromEngine::TranscriptionComplete(result))
                .await;
        }
        Err(error) => {
            log::error!("Windowed inference failed: {error}");
            context
                .send_failure(FailureStage::Decode, error.to_string())
                .await;
        }
    }
}

/// Fetches the model weights (downloading on first use) and constructs the
/// pipeline, reporting loader progress to the front end.
async fn load_pipeline(
    context: &super::AppContextHandle,
    key: &PipelineKey,
) -> Result<WhisperPipeline, PipelineLoadError> {
    let model_path =
        super::model_service::ensure_model_file(context, key.model, key.precision).await?;

    let use_accelerator = key.use_accelerator;
    let pipeline =
        tokio::task::spawn_blocking(move || WhisperPipeline::load(&model_path, use_accelerator))
            .await
            .expect("pipeline construction task panicked")?;

    context
        .send(MessageFromEngine::LoadProgress(LoadEvent::Ready))
        .await;

    Ok(pipeline)
}
