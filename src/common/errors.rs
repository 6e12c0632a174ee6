use thiserror::Error;

/// Errors surfaced by stream resolution and session orchestration.
///
/// Resolver failures are always recovered locally: the session converts
/// them into an [`ExtractionResult::Failure`](crate::session::ExtractionResult)
/// rather than propagating them as faults.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// No resolver service recognises the given URL.
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// Fetching or parsing the source page failed.
    #[error("{0}")]
    PageFetch(String),

    /// The page resolved but yielded no playable streams.
    #[error("no streams found")]
    NoStreams,

    /// The session was already released; no further extractions accepted.
    #[error("session already released")]
    SessionReleased,
}
