//! Consumer-side state machine for one transcription run.
//!
//! The session collects the ordered [`DecodeEvent`] stream of a decode run
//! into chunks, feeds sealed chunks to the overlap merger, tracks decode
//! throughput, and reports a live snapshot to the caller after every token.

use std::time::Instant;

use crate::chunk::{Chunk, ChunkView, MergedChunk, TranscriptionResult};
use crate::merge::OverlapMerger;
use crate::rate::TokenRateEstimator;
use crate::{DecodeEvent, DecodeObserver, WindowParams};

/// Best-effort snapshot of the transcript, emitted once per token.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveUpdate {
    /// Merged chunks plus the open chunk when it does not overlap them.
    pub chunks: Vec<ChunkView>,
    /// Most recently computed decode rate, if any window has produced two
    /// or more tokens so far.
    pub tokens_per_second: Option<f64>,
}

/// Collects decode events into merged chunks for one transcription run.
///
/// Raw chunks live in an arena for the duration of the run; the chunk
/// currently receiving tokens is addressed by index rather than held as a
/// separate mutable reference. The `on_update` callback is invoked
/// synchronously for every token, in event order.
pub struct TranscriptionSession<F: FnMut(LiveUpdate)> {
    window: WindowParams,
    window_index: usize,
    chunks: Vec<Chunk>,
    open_chunk: Option<usize>,
    merger: OverlapMerger,
    rate: TokenRateEstimator,
    last_rate: Option<f64>,
    on_update: F,
}

impl<F: FnMut(LiveUpdate)> TranscriptionSession<F> {
    pub fn new(window: WindowParams, on_update: F) -> Self {
        Self {
            window,
            window_index: 0,
            chunks: Vec::new(),
            open_chunk: None,
            merger: OverlapMerger::new(),
            rate: TokenRateEstimator::new(),
            last_rate: None,
            on_update,
        }
    }

    /// Consumes the session once decoding has ended, producing the final
    /// transcript. The full text is the merged chunk texts joined and
    /// trimmed.
    pub fn finish(self) -> TranscriptionResult {
        let chunks = self.merger.into_chunks();
        let text = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<String>()
            .trim()
            .to_string();

        TranscriptionResult {
            text,
            chunks,
            tokens_per_second: self.last_rate,
        }
    }
}

impl<F: FnMut(LiveUpdate)> DecodeObserver for TranscriptionSession<F> {
    fn on_event(&mut self, event: DecodeEvent) {
        match event {
            DecodeEvent::WindowStart { local_start } => {
                let offset = self.window.offset_at(self.window_index);
                self.chunks.push(Chunk {
                    text: String::new(),
                    start: offset + local_start,
                    end: None,
                    offset,
                    finalized: false,
                });
                self.open_chunk = Some(self.chunks.len() - 1);
            }
            DecodeEvent::Token { piece } => {
                if let Some(rate) = self.rate.record_token(Instant::now()) {
                    self.last_rate = Some(rate);
                }

                let Some(index) = self.open_chunk else {
                    log::warn!("Token {piece:?} arrived with no open chunk, ignoring it.");
                    return;
                };

                self.chunks[index].text.push_str(&piece);

                let update = LiveUpdate {
                    chunks: self.merger.display_view(Some(&self.chunks[index])),
                    tokens_per_second: self.last_rate,
                };
                (self.on_update)(update);
            }
            DecodeEvent::WindowEnd { local_end } => {
                let Some(index) = self.open_chunk.take() else {
                    log::warn!("Window end arrived with no open chunk, ignoring it.");
                    return;
                };

                let chunk = &mut self.chunks[index];
                let end = chunk.offset + local_end;
                chunk.end = Some(end);
                chunk.finalized = true;

                self.merger.push(MergedChunk {
                    text: chunk.text.clone(),
                    timestamp: (chunk.start, end),
                    offset: chunk.offset,
                });
            }
            DecodeEvent::WindowFinalize => {
                self.rate.reset();
                self.window_index += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn drive(events: Vec<DecodeEvent>) -> (Vec<LiveUpdate>, TranscriptionResult) {
        let updates = Rc::new(RefCell::new(Vec::new()));
        let sink = updates.clone();

        let mut session = TranscriptionSession::new(WindowParams::STANDARD, move |update| {
            sink.borrow_mut().push(update);
        });
        for event in events {
            session.on_event(event);
        }

        let result = session.finish();
        (Rc::try_unwrap(updates).unwrap().into_inner(), result)
    }

    fn window(local_start: f64, pieces: &[&str], local_end: f64) -> Vec<DecodeEvent> {
        let mut events = vec![DecodeEvent::WindowStart { local_start }];
        events.extend(pieces.iter().map(|piece| DecodeEvent::Token {
            piece: piece.to_string(),
        }));
        events.push(DecodeEvent::WindowEnd { local_end });
        events.push(DecodeEvent::WindowFinalize);
        events
    }

    #[test]
    fn single_window_produces_one_chunk() {
        let (updates, result) = drive(window(0.5, &["Hel", "lo"], 4.0));

        assert_eq!(updates.len(), 2);
        assert_eq!(result.text, "Hello");
        assert_eq!(
            result.chunks,
            vec![MergedChunk {
                text: "Hello".to_string(),
                timestamp: (0.5, 4.0),
                offset: 0.0,
            }]
        );
    }

    #[test]
    fn consecutive_windows_get_strided_offsets() {
        let mut events = window(0.0, &["one "], 26.0);
        events.extend(window(0.0, &["two "], 25.0));
        events.extend(window(1.0, &["three"], 10.0));

        let (_, result) = drive(events);

        // Second window starts at 25 s, third at 50 s; overlapped starts
        // are truncated to the previous chunk's end.
        assert_eq!(result.chunks[0].timestamp, (0.0, 26.0));
        assert_eq!(result.chunks[1].timestamp, (26.0, 50.0));
        assert_eq!(result.chunks[2].timestamp, (51.0, 60.0));
    }

    #[test]
    fn overlap_truncates_timestamps_but_keeps_text() {
        let mut events = window(0.0, &["Hello "], 26.0);
        events.extend(window(0.0, &["world, ", "this is "], 25.0));

        let (_, result) = drive(events);

        assert_eq!(
            result.chunks,
            vec![
                MergedChunk {
                    text: "Hello ".to_string(),
                    timestamp: (0.0, 26.0),
                    offset: 0.0,
                },
                MergedChunk {
                    text: "world, this is ".to_string(),
                    timestamp: (26.0, 50.0),
                    offset: 25.0,
                },
            ]
        );
        assert_eq!(result.text, "Hello world, this is");
    }

    #[test]
    fn one_update_per_token_in_event_order() {
        let mut events = window(0.0, &["a", "b", "c"], 26.0);
        events.extend(window(0.0, &["d"], 25.0));

        let (updates, _) = drive(events);

        assert_eq!(updates.len(), 4);
        assert_eq!(updates[0].chunks[0].text, "a");
        assert_eq!(updates[1].chunks[0].text, "ab");
        assert_eq!(updates[2].chunks[0].text, "abc");
    }

    #[test]
    fn update_hides_open_chunk_overlapping_merged_span() {
        let mut events = window(0.0, &["first"], 26.0);
        // Second window opens at 25 s, inside the merged chunk's range.
        events.push(DecodeEvent::WindowStart { local_start: 0.0 });
        events.push(DecodeEvent::Token {
            piece: "second".to_string(),
        });

        let (updates, _) = drive(events);

        let last = updates.last().unwrap();
        assert_eq!(last.chunks.len(), 1);
        assert_eq!(last.chunks[0].text, "first");
    }

    #[test]
    fn token_without_open_chunk_is_ignored() {
        let (updates, result) = drive(vec![DecodeEvent::Token {
            piece: "stray".to_string(),
        }]);

        assert!(updates.is_empty());
        assert!(result.chunks.is_empty());
        assert_eq!(result.text, "");
    }

    #[test]
    fn final_rate_survives_window_finalize() {
        let (updates, result) = drive(window(0.0, &["a", "b"], 5.0));

        assert_eq!(updates[0].tokens_per_second, None);
        assert!(updates[1].tokens_per_second.is_some());
        // WindowFinalize resets the estimator's counters, but the last
        // computed figure is what the final result reports.
        assert_eq!(result.tokens_per_second, updates[1].tokens_per_second);
    }

    #[test]
    fn empty_window_still_advances_the_offset() {
        let mut events = vec![DecodeEvent::WindowFinalize];
        events.extend(window(0.0, &["late"], 4.0));

        let (_, result) = drive(events);

        assert_eq!(result.chunks[0].timestamp, (25.0, 29.0));
        assert_eq!(result.chunks[0].offset, 25.0);
    }
}
