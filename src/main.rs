use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use murmur_bridge::model::{ModelPrecision, WhisperModel};
use murmur_bridge::{
    BridgeChannels, DecodeTask, MessageFromEngine, MessageToEngine, TranscribeRequest,
};

mod formatting;

struct CliArgs {
    audio_path: PathBuf,
    model: Option<WhisperModel>,
    precision: Option<ModelPrecision>,
    translate: bool,
    language: Option<String>,
    cpu_only: bool,
    srt_path: Option<PathBuf>,
    json_path: Option<PathBuf>,
    txt_path: Option<PathBuf>,
}

const USAGE: &str = "usage: murmur <audio.wav> [--model tiny|base|small|medium|large-turbo|large] \
[--precision full|q8|q5] [--translate] [--language CODE] [--cpu] \
[--srt PATH] [--json PATH] [--txt PATH]";

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut audio_path = None;
    let mut model = None;
    let mut precision = None;
    let mut translate = false;
    let mut language = None;
    let mut cpu_only = false;
    let mut srt_path = None;
    let mut json_path = None;
    let mut txt_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value_of = |flag: &str| {
            args.next()
                .with_context(|| format!("{flag} expects a value\n{USAGE}"))
        };

        match arg.as_str() {
            "--model" => {
                model = Some(value_of("--model")?.parse().map_err(anyhow::Error::msg)?);
            }
            "--precision" => {
                precision = Some(value_of("--precision")?.parse().map_err(anyhow::Error::msg)?);
            }
            "--translate" => translate = true,
            "--language" => language = Some(value_of("--language")?),
            "--cpu" => cpu_only = true,
            "--srt" => srt_path = Some(PathBuf::from(value_of("--srt")?)),
            "--json" => json_path = Some(PathBuf::from(value_of("--json")?)),
            "--txt" => txt_path = Some(PathBuf::from(value_of("--txt")?)),
            other if audio_path.is_none() && !other.starts_with('-') => {
                audio_path = Some(PathBuf::from(other));
            }
            other => anyhow::bail!("unexpected argument {other:?}\n{USAGE}"),
        }
    }

    Ok(CliArgs {
        audio_path: audio_path.with_context(|| format!("missing audio file\n{USAGE}"))?,
        model,
        precision,
        translate,
        language,
        cpu_only,
        srt_path,
        json_path,
        txt_path,
    })
}

/// Decodes a WAV file into mono samples at the rate the engine expects.
fn load_audio(path: &Path) -> anyhow::Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open audio file {path:?}"))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono = match spec.channels {
        1 => samples,
        2 => murmur_audio::mixer::downmix_interleaved_stereo(&samples),
        channels => anyhow::bail!("unsupported channel count: {channels}"),
    };

    log::info!(
        "Loaded {} frames at {} Hz ({} channel(-s)).",
        mono.len(),
        spec.sample_rate,
        spec.channels,
    );

    Ok(murmur_audio::resampler::resample_buffer(
        &mono,
        spec.sample_rate,
        murmur_stream::SAMPLE_RATE,
    )?)
}

fn report_load_progress(event: murmur_bridge::load::LoadEvent) {
    use murmur_bridge::load::LoadEvent;

    match event {
        LoadEvent::Initiate { file } => log::info!("Fetching model file {file}..."),
        LoadEvent::Progress {
            file,
            downloaded_bytes,
            total_bytes,
            speed,
            remaining_time,
        } => {
            eprint!(
                "\r{file}: {} / {} ({}, {} left)    ",
                formatting::format_bytes(downloaded_bytes),
                formatting::format_bytes(total_bytes),
                formatting::format_speed(speed),
                formatting::format_eta(remaining_time),
            );
        }
        LoadEvent::Done { file } => {
            eprintln!();
            log::info!("Model file {file} is on disk.");
        }
        LoadEvent::Ready => log::info!("Pipeline is ready, starting transcription."),
    }
}

fn report_update(update: &murmur_bridge::LiveUpdate) {
    let tail = update
        .chunks
        .last()
        .map(|chunk| chunk.text.trim().chars().take(60).collect::<String>())
        .unwrap_or_default();
    let rate = update
        .tokens_per_second
        .map(|tps| format!("{tps:.1} tok/s"))
        .unwrap_or_else(|| "-- tok/s".to_string());

    eprint!("\r[{} chunks | {rate}] {tail}    ", update.chunks.len());
}

fn write_exports(
    args: &CliArgs,
    result: &murmur_bridge::TranscriptionResult,
) -> anyhow::Result<()> {
    let views = result.chunk_views();

    if let Some(path) = &args.srt_path {
        std::fs::write(path, murmur_export::to_srt(&views))
            .with_context(|| format!("failed to write {path:?}"))?;
        log::info!("Wrote subtitles to {path:?}.");
    }
    if let Some(path) = &args.json_path {
        std::fs::write(path, murmur_export::to_json(&views)?)
            .with_context(|| format!("failed to write {path:?}"))?;
        log::info!("Wrote chunk records to {path:?}.");
    }
    if let Some(path) = &args.txt_path {
        std::fs::write(path, murmur_export::to_plain_text(&views))
            .with_context(|| format!("failed to write {path:?}"))?;
        log::info!("Wrote plain text to {path:?}.");
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()
        .expect("failed to build logger instance");

    let args = parse_args()?;
    let audio = load_audio(&args.audio_path)?;

    let mut channels = BridgeChannels::default();
    murmur_engine::run(channels.engine_rx, channels.engine_tx);

    channels
        .frontend_tx
        .blocking_send(MessageToEngine::ConfigurationRequest)
        .expect("failed to send configuration request");

    let mut audio = Some(audio);
    while let Some(message) = channels.frontend_rx.blocking_recv() {
        match message {
            MessageFromEngine::ConfigurationResponse(config) => {
                let defaults = config.transcription;
                let request = TranscribeRequest {
                    audio: audio.take().expect("configuration response arrived twice"),
                    model: args.model.unwrap_or(defaults.model),
                    precision: args.precision.unwrap_or(defaults.precision),
                    use_accelerator: !args.cpu_only && defaults.use_accelerator,
                    task: if args.translate {
                        DecodeTask::Translate
                    } else {
                        DecodeTask::Transcribe
                    },
                    language: args.language.clone().or(defaults.language),
                };
                channels
                    .frontend_tx
                    .blocking_send(MessageToEngine::Transcribe(request))
                    .expect("failed to send transcription request");
            }
            MessageFromEngine::LoadProgress(event) => report_load_progress(event),
            MessageFromEngine::TranscriptionUpdate(update) => report_update(&update),
            MessageFromEngine::TranscriptionComplete(result) => {
                eprintln!();
                println!("{}", result.text);
                std::io::stdout().flush().ok();
                write_exports(&args, &result)?;
                return Ok(());
            }
            MessageFromEngine::TranscriptionFailed { stage, message } => {
                eprintln!();
                anyhow::bail!("transcription failed during {stage:?}: {message}");
            }
        }
    }

    anyhow::bail!("engine closed the bridge before completing the run");
}
