//! Transcript segment types shared by the collector, the merge engine, and
//! downstream consumers.

use serde::Serialize;

/// A text segment produced while decoding one window.
///
/// Owned by the collector while open: `text` only grows and `end` stays
/// unset until the window that produced the chunk ends. Once sealed
/// (`finalized` set), the chunk is handed to the merge engine and never
/// mutated again.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Accumulated text of the segment, appended to on every token.
    pub text: String,
    /// Absolute start time in seconds from the beginning of the audio.
    pub start: f64,
    /// Absolute end time in seconds; set when the window ends.
    pub end: Option<f64>,
    /// Start of the producing window, in seconds from the beginning of the
    /// audio.
    pub offset: f64,
    /// Whether the chunk has been sealed by a window-end event.
    pub finalized: bool,
}

/// A finalized, non-overlapping segment of the merged transcript.
///
/// Across a merged sequence, each chunk's start is at or after the previous
/// chunk's end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedChunk {
    pub text: String,
    /// Absolute `(start, end)` time range in seconds.
    pub timestamp: (f64, f64),
    /// Start of the window the chunk originated from, in seconds.
    pub offset: f64,
}

/// Snapshot of a chunk for progressive display and export.
///
/// The end timestamp is `None` while the chunk's window is still being
/// decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkView {
    pub text: String,
    pub timestamp: (f64, Option<f64>),
}

impl From<&Chunk> for ChunkView {
    fn from(chunk: &Chunk) -> Self {
        Self {
            text: chunk.text.clone(),
            timestamp: (chunk.start, chunk.end),
        }
    }
}

impl From<&MergedChunk> for ChunkView {
    fn from(chunk: &MergedChunk) -> Self {
        Self {
            text: chunk.text.clone(),
            timestamp: (chunk.timestamp.0, Some(chunk.timestamp.1)),
        }
    }
}

/// Final outcome of one transcription run.
///
/// Owned by the caller once emitted; the engine holds no reference to it
/// after completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    /// Full transcript text: the merged chunk texts joined and trimmed.
    pub text: String,
    /// The merged, time-ordered chunk sequence.
    pub chunks: Vec<MergedChunk>,
    /// Decode throughput observed during the run, if at least one window
    /// produced two or more tokens.
    pub tokens_per_second: Option<f64>,
}

impl TranscriptionResult {
    /// Display snapshots of the final chunk list, for exporters that also
    /// accept in-progress chunks.
    pub fn chunk_views(&self) -> Vec<ChunkView> {
        self.chunks.iter().map(ChunkView::from).collect()
    }
}
