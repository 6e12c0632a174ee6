use crate::common::types::AnyError;

/// Collaborator for defect-class errors escaping the background
/// resolution task (panics, broken invariants).
///
/// Expected extraction failures never arrive here; they are converted to
/// [`ExtractionResult::Failure`](super::ExtractionResult) instead. What
/// does arrive indicates a programming bug and must not be silently
/// swallowed.
pub trait FaultReporter: Send + Sync {
    fn report(&self, context: &str, error: &AnyError);
}

/// Default reporter: logs at error level.
pub struct TracingFaultReporter;

impl FaultReporter for TracingFaultReporter {
    fn report(&self, context: &str, error: &AnyError) {
        tracing::error!("{}: {}", context, error);
    }
}
