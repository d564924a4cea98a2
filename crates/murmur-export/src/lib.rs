//! Transcript exporters.
//!
//! All exporters consume the immutable chunk list produced by a finished
//! transcription run (or a display snapshot of one still in progress) and
//! impose no requirements back on the engine.

use std::fmt::Write;

use murmur_stream::chunk::ChunkView;

/// Joins the chunk texts into one plain-text transcript, trimmed.
pub fn to_plain_text(chunks: &[ChunkView]) -> String {
    let mut text = String::new();
    for chunk in chunks {
        text.push_str(&chunk.text);
    }
    text.trim().to_string()
}

/// Serializes the chunk list as pretty-printed JSON, one record per chunk.
pub fn to_json(chunks: &[ChunkView]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(chunks)
}

/// Formats the chunk list as SubRip subtitles: a 1-based sequence number,
/// the time range, and the chunk text, separated by blank lines.
///
/// A chunk with no end timestamp (still being decoded when the snapshot was
/// taken) falls back to its start timestamp.
pub fn to_srt(chunks: &[ChunkView]) -> String {
    let mut srt = String::new();
    for (index, chunk) in chunks.iter().enumerate() {
        let (start, end) = chunk.timestamp;
        let end = end.unwrap_or(start);

        writeln!(&mut srt, "{}", index + 1).unwrap();
        writeln!(
            &mut srt,
            "{} --> {}",
            format_srt_timestamp(start),
            format_srt_timestamp(end)
        )
        .unwrap();
        writeln!(&mut srt, "{}\n", chunk.text).unwrap();
    }

    srt
}

/// Formats a position in seconds as the SubRip `HH:MM:SS,mmm` timestamp.
fn format_srt_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;

    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(text: &str, start: f64, end: Option<f64>) -> ChunkView {
        ChunkView {
            text: text.to_string(),
            timestamp: (start, end),
        }
    }

    #[test]
    fn srt_export_of_a_single_chunk() {
        let chunks = vec![view("Hi.", 0.0, Some(1.0))];

        assert_eq!(to_srt(&chunks), "1\n00:00:00,000 --> 00:00:01,000\nHi.\n\n");
    }

    #[test]
    fn srt_missing_end_falls_back_to_start() {
        let chunks = vec![view("still talking", 61.5, None)];

        assert_eq!(
            to_srt(&chunks),
            "1\n00:01:01,500 --> 00:01:01,500\nstill talking\n\n"
        );
    }

    #[test]
    fn srt_numbers_chunks_from_one() {
        let chunks = vec![
            view("first", 0.0, Some(2.0)),
            view("second", 2.0, Some(3661.25)),
        ];
        let srt = to_srt(&chunks);

        assert!(srt.starts_with("1\n"));
        assert!(srt.contains("\n2\n"));
        assert!(srt.contains("00:00:02,000 --> 01:01:01,250"));
    }

    #[test]
    fn plain_text_joins_and_trims() {
        let chunks = vec![view(" Hello ", 0.0, Some(1.0)), view("world. ", 1.0, Some(2.0))];

        assert_eq!(to_plain_text(&chunks), "Hello world.");
    }

    #[test]
    fn json_export_keeps_timestamps_as_arrays() {
        let chunks = vec![view("Hi.", 0.0, Some(1.0))];
        let json = to_json(&chunks).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["text"], "Hi.");
        assert_eq!(value[0]["timestamp"][0], 0.0);
        assert_eq!(value[0]["timestamp"][1], 1.0);
    }
}
