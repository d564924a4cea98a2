//! Overlap resolution for chunks produced by overlapping decode windows.
//!
//! The tail of window *N* and the head of window *N+1* describe the same
//! audio span, so both windows may produce chunks covering it. The merger
//! folds each sealed chunk into a single time-ordered sequence in which no
//! two chunks claim overlapping time.

use crate::chunk::{Chunk, ChunkView, MergedChunk};

/// Folds sealed chunks into a non-overlapping, time-ordered transcript.
///
/// An overlap-truncated chunk keeps its full text; only its time range is
/// cut down to start where the previous merged chunk ends. Words spoken
/// inside the overlap can therefore appear in two adjacent chunks' texts.
/// The text is never re-split at the token level.
#[derive(Debug, Clone, Default)]
pub struct OverlapMerger {
    merged: Vec<MergedChunk>,
}

impl OverlapMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one sealed chunk into the merged sequence.
    ///
    /// A chunk whose window begins before the previous merged chunk ends is
    /// truncated to start at that end; if nothing of its time range remains,
    /// it is dropped entirely. A chunk with no overlap is appended as is.
    pub fn push(&mut self, chunk: MergedChunk) {
        let Some(last) = self.merged.last() else {
            self.merged.push(chunk);
            return;
        };

        let last_end = last.timestamp.1;
        if chunk.offset < last_end {
            let new_start = last_end;
            if new_start < chunk.timestamp.1 {
                self.merged.push(MergedChunk {
                    text: chunk.text,
                    timestamp: (new_start, chunk.timestamp.1),
                    offset: chunk.offset,
                });
            }
            // otherwise the chunk lies entirely within the merged span
        } else {
            self.merged.push(chunk);
        }
    }

    /// The merged sequence accumulated so far.
    pub fn chunks(&self) -> &[MergedChunk] {
        &self.merged
    }

    /// Transient display list: the merged sequence plus the currently open
    /// chunk, included only when its start does not fall inside the merged
    /// span. Recomputed from scratch on every token and discarded once the
    /// window seals and the real merge runs.
    pub fn display_view(&self, open: Option<&Chunk>) -> Vec<ChunkView> {
        let mut view: Vec<ChunkView> = self.merged.iter().map(ChunkView::from).collect();

        if let Some(open) = open {
            match self.merged.last() {
                None => view.push(open.into()),
                Some(last) if open.start >= last.timestamp.1 => view.push(open.into()),
                Some(_) => {}
            }
        }

        view
    }

    /// Consumes the merger, returning the final merged sequence.
    pub fn into_chunks(self) -> Vec<MergedChunk> {
        self.merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed(text: &str, start: f64, end: f64, offset: f64) -> MergedChunk {
        MergedChunk {
            text: text.to_string(),
            timestamp: (start, end),
            offset,
        }
    }

    fn assert_non_overlapping(chunks: &[MergedChunk]) {
        for pair in chunks.windows(2) {
            assert!(
                pair[1].timestamp.0 >= pair[0].timestamp.1,
                "chunks overlap: {pair:?}"
            );
        }
    }

    #[test]
    fn first_chunk_is_appended_unchanged() {
        let mut merger = OverlapMerger::new();
        merger.push(sealed("Hello ", 0.2, 26.0, 0.0));

        assert_eq!(merger.chunks(), &[sealed("Hello ", 0.2, 26.0, 0.0)]);
    }

    #[test]
    fn non_overlapping_chunk_passes_through_unchanged() {
        let mut merger = OverlapMerger::new();
        merger.push(sealed("one", 0.0, 10.0, 0.0));
        merger.push(sealed("two", 12.0, 20.0, 12.0));

        assert_eq!(merger.chunks()[1], sealed("two", 12.0, 20.0, 12.0));
        assert_non_overlapping(merger.chunks());
    }

    #[test]
    fn overlapping_chunk_start_is_truncated_text_kept() {
        let mut merger = OverlapMerger::new();
        merger.push(sealed("Hello ", 0.0, 26.0, 0.0));
        merger.push(sealed("world, this is ", 25.0, 50.0, 25.0));

        assert_eq!(
            merger.chunks(),
            &[
                sealed("Hello ", 0.0, 26.0, 0.0),
                sealed("world, this is ", 26.0, 50.0, 25.0),
            ]
        );
    }

    #[test]
    fn fully_contained_chunk_is_dropped() {
        let mut merger = OverlapMerger::new();
        merger.push(sealed("long", 0.0, 30.0, 0.0));
        merger.push(sealed("swallowed", 25.0, 29.0, 25.0));

        assert_eq!(merger.chunks().len(), 1);
    }

    #[test]
    fn merged_sequence_stays_monotonic() {
        let mut merger = OverlapMerger::new();
        merger.push(sealed("a", 0.5, 26.0, 0.0));
        merger.push(sealed("b", 25.0, 50.5, 25.0));
        merger.push(sealed("c", 50.0, 55.0, 50.0));
        merger.push(sealed("d", 50.0, 52.0, 50.0));
        merger.push(sealed("e", 80.0, 90.0, 75.0));

        assert_non_overlapping(merger.chunks());
    }

    #[test]
    fn display_includes_open_chunk_when_merged_is_empty() {
        let merger = OverlapMerger::new();
        let open = Chunk {
            text: "partial".to_string(),
            start: 0.0,
            end: None,
            offset: 0.0,
            finalized: false,
        };

        let view = merger.display_view(Some(&open));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].timestamp, (0.0, None));
    }

    #[test]
    fn display_excludes_open_chunk_inside_merged_span() {
        let mut merger = OverlapMerger::new();
        merger.push(sealed("done", 0.0, 26.0, 0.0));

        let open = Chunk {
            text: "overlapping".to_string(),
            start: 25.0,
            end: None,
            offset: 25.0,
            finalized: false,
        };

        assert_eq!(merger.display_view(Some(&open)).len(), 1);

        let clear = Chunk {
            text: "clear".to_string(),
            start: 26.0,
            end: None,
            offset: 25.0,
            finalized: false,
        };

        assert_eq!(merger.display_view(Some(&clear)).len(), 2);
    }
}
