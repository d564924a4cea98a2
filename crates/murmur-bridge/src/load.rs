//! Model loading progress events.

/// Progress of fetching and constructing a transcription pipeline.
///
/// Forwarded to the front end verbatim for display; the engine's own logic
/// never inspects these. A cached pipeline produces no load events at all.
#[derive(Debug, Clone)]
pub enum LoadEvent {
    /// A model file download is about to begin.
    Initiate {
        /// Name of the file being fetched.
        file: String,
    },
    /// One slice of the download completed.
    Progress {
        file: String,
        /// Amount of downloaded bytes to this point.
        downloaded_bytes: u64,
        /// Overall amount of bytes to be downloaded.
        total_bytes: u64,
        /// Current speed in bytes per second.
        speed: f64,
        /// Estimated remaining time until download completion, in seconds.
        remaining_time: f64,
    },
    /// The model file is fully on disk.
    Done { file: String },
    /// The pipeline is constructed and about to start serving the request.
    Ready,
}
