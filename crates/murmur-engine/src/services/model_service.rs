use std::path::PathBuf;
use std::str::FromStr;

use futures_util::StreamExt;
use murmur_bridge::MessageFromEngine;
use murmur_bridge::load::LoadEvent;
use murmur_bridge::model::{ModelPrecision, WhisperModel};
use reqwest::Url;
use tokio::io::AsyncWriteExt;

/// Errors that can occur while fetching model weights.
#[derive(Debug, thiserror::Error)]
pub enum ModelFetchError {
    /// The configured model source is not a valid URL.
    #[error("invalid model source URL: {0}")]
    InvalidSource(String),
    /// The download request failed or was interrupted.
    #[error("failed to download model file: {0}")]
    Http(#[from] reqwest::Error),
    /// Writing the model file to the cache directory failed.
    #[error("failed to write model file: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the download URL for the given model file.
///
/// The base URL comes from the application configuration; the file name is
/// appended to it.
fn build_download_url(base_url: &str, model_file_name: &str) -> Result<Url, ModelFetchError> {
    Url::from_str(base_url)
        .and_then(|base| base.join(model_file_name))
        .map_err(|error| ModelFetchError::InvalidSource(error.to_string()))
}

/// Ensures the weights for the given model and precision are on disk,
/// downloading them on first use.
///
/// Download progress is forwarded to the front end as [`LoadEvent`]s. The
/// file is written next to its final location and only moved there once the
/// download completes, so an interrupted fetch never leaves a truncated
/// file that would later be mistaken for a cached model.
pub async fn ensure_model_file(
    context: &super::AppContextHandle,
    model: WhisperModel,
    precision: ModelPrecision,
) -> Result<PathBuf, ModelFetchError> {
    let (base_url, request_client, cache_path) = {
        let state = context.state.read().await;
        (
            state.config.model_source.base_url.clone(),
            state.request_client.clone(),
            state.cache_path.clone(),
        )
    };

    let model_file_name = model.file_name(precision);
    let save_path = cache_path.join(model_file_name);
    if save_path.exists() {
        log::debug!("Model file {save_path:?} is already cached.");
        return Ok(save_path);
    }

    let model_download_url = build_download_url(&base_url, model_file_name)?;
    log::info!("Downloading model {model:?} from {model_download_url}, saving to {save_path:?}");

    if let Some(parent) = save_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let partial_path = save_path.with_extension("partial");
    let mut output_file = tokio::fs::File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&partial_path)
        .await?;

    context
        .send(MessageFromEngine::LoadProgress(LoadEvent::Initiate {
            file: model_file_name.to_string(),
        }))
        .await;

    let response = request_client
        .get(model_download_url)
        .send()
        .await?
        .error_for_status()?;

    let start = tokio::time::Instant::now();
    let total_bytes = response.content_length().unwrap_or(0);
    let mut downloaded_bytes = 0u64;

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let current_chunk = chunk?;
        output_file.write_all(&current_chunk).await?;
        downloaded_bytes += current_chunk.len() as u64;

        let elapsed_secs = start.elapsed().as_secs_f64();
        let speed = downloaded_bytes as f64 / elapsed_secs;
        let remaining_time = total_bytes.saturating_sub(downloaded_bytes) as f64 / speed;

        // notify the front end about current state
        context
            .send(MessageFromEngine::LoadProgress(LoadEvent::Progress {
                file: model_file_name.to_string(),
                downloaded_bytes,
                total_bytes,
                speed,
                remaining_time,
            }))
            .await;
    }

    output_file.sync_all().await?;
    drop(output_file);
    tokio::fs::rename(&partial_path, &save_path).await?;

    context
        .send(MessageFromEngine::LoadProgress(LoadEvent::Done {
            file: model_file_name.to_string(),
        }))
        .await;

    Ok(save_path)
}
