//! Collaborator interface for page-to-stream resolution.
//!
//! The resolver is an opaque external library from the session's point of
//! view: it maps a page URL to an ordered list of playable streams.
//! Resolution is synchronous and may block on network I/O, so the session
//! only ever invokes it from the blocking pool.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::errors::ExtractionError;
use crate::session::ExtractionResult;

/// One playable stream as reported by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStream {
    /// Direct media URL.
    pub content: String,
}

/// Per-URL extraction handle produced by [`StreamResolver::create_extractor`].
pub trait StreamExtractor {
    /// Fetch and parse the source page. Must be called before
    /// [`video_streams`](Self::video_streams).
    fn fetch_page(&mut self) -> Result<(), ExtractionError>;

    /// Streams in the source's preferred order. The session always picks
    /// the first one; it does not evaluate quality or format.
    fn video_streams(&self) -> Vec<VideoStream>;

    /// Display title of the extracted media.
    fn name(&self) -> &str;
}

/// A page-scraping/stream-resolution backend.
pub trait StreamResolver: Send + Sync {
    /// Identifier for logging (e.g. "newpipe", "fake").
    fn name(&self) -> &str;

    /// Supply the HTTP client the resolver should perform I/O with.
    /// Called before every extraction attempt and must be idempotent.
    fn initialize(&self, http: &reqwest::blocking::Client);

    /// Build an extractor for the given URL. Fails when no service
    /// recognises the URL.
    fn create_extractor(&self, url: &str) -> Result<Box<dyn StreamExtractor>, ExtractionError>;
}

/// Outcome of one blocking resolution run.
pub(crate) enum ResolveOutcome {
    Resolved(ExtractionResult),
    /// The request was superseded or the session released mid-flight.
    /// Discarded without becoming a user-visible failure.
    Cancelled,
}

/// Run a full resolution pass: initialise, extract, fetch, pick the first
/// stream. Checks `cancelled` between steps; cancellation is cooperative,
/// so a step already underway runs to completion and its result is simply
/// dropped by the caller.
pub(crate) fn resolve_first_stream(
    resolver: &dyn StreamResolver,
    http: &reqwest::blocking::Client,
    url: &str,
    cancelled: &AtomicBool,
) -> ResolveOutcome {
    resolver.initialize(http);

    if cancelled.load(Ordering::Acquire) {
        return ResolveOutcome::Cancelled;
    }

    let mut extractor = match resolver.create_extractor(url) {
        Ok(e) => e,
        Err(e) => return failure(e),
    };

    if cancelled.load(Ordering::Acquire) {
        return ResolveOutcome::Cancelled;
    }

    if let Err(e) = extractor.fetch_page() {
        if cancelled.load(Ordering::Acquire) {
            // Interrupted I/O from a superseded request is expected noise.
            tracing::warn!("fetch aborted after cancellation: {}", e);
            return ResolveOutcome::Cancelled;
        }
        return failure(e);
    }

    let Some(stream) = extractor.video_streams().into_iter().next() else {
        return failure(ExtractionError::NoStreams);
    };

    ResolveOutcome::Resolved(ExtractionResult::Success {
        title: extractor.name().to_string(),
        stream_url: stream.content,
    })
}

fn failure(error: ExtractionError) -> ResolveOutcome {
    ResolveOutcome::Resolved(ExtractionResult::Failure {
        error_message: error.to_string(),
    })
}
