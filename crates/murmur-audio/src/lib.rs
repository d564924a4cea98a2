//! Audio utilities for preparing transcription input.
//!
//! This crate wraps low-level audio building blocks into a small set of
//! helpers oriented toward offline mono processing. It focuses on:
//! - Converting interleaved stereo frames to mono samples.
//! - Resampling mono audio buffers with FFT-based resamplers.
//!
//! Speech models consume mono audio at a fixed rate, so decoded files of
//! any channel layout and rate are funneled through these helpers first.

pub mod mixer;
pub mod resampler;
