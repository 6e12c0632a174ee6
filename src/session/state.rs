use parking_lot::Mutex;
use serde::Serialize;

use crate::common::types::{RequestId, SessionId};

/// Opaque handle for one outstanding resolve-and-play attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRequest {
    id: RequestId,
}

impl ExtractionRequest {
    pub(crate) fn new(id: RequestId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }
}

/// Terminal outcome of a resolution attempt. Exactly one variant per
/// non-stale request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "status")]
pub enum ExtractionResult {
    Success { title: String, stream_url: String },
    Failure { error_message: String },
}

/// Observable snapshot of a session.
///
/// Invariant: `is_loading` is true iff `active_request` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub active_request: Option<RequestId>,
}

/// Request lifecycle guarded as one unit: the generation counter, the
/// loading indicator, and the released flag change together or not at
/// all, so supersession, completion, and release linearize against each
/// other.
struct Lifecycle {
    generation: u64,
    loading: bool,
    released: bool,
}

/// State visible from both the caller thread and the worker task.
///
/// The lifecycle critical section is the single cross-context
/// synchronization point: `begin_request` supersedes the in-flight
/// request, `complete_if_current` decides atomically whether a result is
/// still current and, if so, turns the loading indicator off in the same
/// step. A stale result can therefore never clobber the state of the
/// request that superseded it. The error banner is only ever written
/// from the worker task.
pub(crate) struct SessionShared {
    pub(crate) session_id: SessionId,
    lifecycle: Mutex<Lifecycle>,
    error_banner: Mutex<Option<String>>,
}

impl SessionShared {
    pub(crate) fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            lifecycle: Mutex::new(Lifecycle {
                generation: 0,
                loading: false,
                released: false,
            }),
            error_banner: Mutex::new(None),
        }
    }

    /// Allocate the next request id and flip the loading indicator on.
    /// Any earlier id is stale from this point onward. Returns `None`
    /// once the session is released.
    pub(crate) fn begin_request(&self) -> Option<RequestId> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.released {
            return None;
        }
        lifecycle.generation += 1;
        lifecycle.loading = true;
        Some(RequestId(lifecycle.generation))
    }

    /// Re-assert the loading indicator for a request that is still
    /// current. False means the request was superseded or the session
    /// released before the worker picked it up.
    pub(crate) fn start_if_current(&self, request: RequestId) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.released || lifecycle.generation != request.0 {
            return false;
        }
        lifecycle.loading = true;
        true
    }

    /// Atomically decide whether `request` is still the active one and,
    /// if so, mark it terminal by turning the loading indicator off.
    /// False means the result is stale and must be discarded untouched.
    pub(crate) fn complete_if_current(&self, request: RequestId) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.released || lifecycle.generation != request.0 {
            return false;
        }
        lifecycle.loading = false;
        true
    }

    pub(crate) fn finish_loading(&self) {
        self.lifecycle.lock().loading = false;
    }

    /// Mark released and clear the loading indicator in the same step,
    /// so an extract racing with release can never leave the indicator
    /// stuck on. Returns true on the first call only.
    pub(crate) fn mark_released(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.released {
            return false;
        }
        lifecycle.released = true;
        lifecycle.loading = false;
        true
    }

    pub(crate) fn set_error(&self, message: String) {
        *self.error_banner.lock() = Some(message);
    }

    pub(crate) fn clear_error(&self) {
        *self.error_banner.lock() = None;
    }

    pub(crate) fn snapshot(&self) -> SessionState {
        let lifecycle = self.lifecycle.lock();
        SessionState {
            is_loading: lifecycle.loading,
            last_error: self.error_banner.lock().clone(),
            active_request: lifecycle.loading.then(|| RequestId(lifecycle.generation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> SessionShared {
        SessionShared::new(SessionId::generate())
    }

    #[test]
    fn test_begin_request_supersedes() {
        let shared = shared();
        let first = shared.begin_request().unwrap();
        let second = shared.begin_request().unwrap();

        assert_eq!(first, RequestId(1));
        assert_eq!(second, RequestId(2));
        assert!(!shared.complete_if_current(first));
        assert!(shared.complete_if_current(second));
    }

    #[test]
    fn test_loading_iff_active_request() {
        let shared = shared();
        let state = shared.snapshot();
        assert!(!state.is_loading);
        assert!(state.active_request.is_none());

        let id = shared.begin_request().unwrap();
        let state = shared.snapshot();
        assert!(state.is_loading);
        assert_eq!(state.active_request, Some(id));

        assert!(shared.complete_if_current(id));
        let state = shared.snapshot();
        assert!(!state.is_loading);
        assert!(state.active_request.is_none());
    }

    #[test]
    fn test_stale_completion_keeps_superseders_loading() {
        let shared = shared();
        let first = shared.begin_request().unwrap();
        let second = shared.begin_request().unwrap();

        // The superseded result must not touch the new request's state.
        assert!(!shared.complete_if_current(first));
        assert!(shared.snapshot().is_loading);
        assert_eq!(shared.snapshot().active_request, Some(second));

        assert!(shared.complete_if_current(second));
        assert!(!shared.snapshot().is_loading);
    }

    #[test]
    fn test_start_if_current_rejects_superseded() {
        let shared = shared();
        let first = shared.begin_request().unwrap();
        let second = shared.begin_request().unwrap();

        assert!(!shared.start_if_current(first));
        assert!(shared.start_if_current(second));
    }

    #[test]
    fn test_mark_released_once_and_clears_loading() {
        let shared = shared();
        let id = shared.begin_request().unwrap();

        assert!(shared.mark_released());
        assert!(!shared.mark_released());

        // Release terminates the in-flight request's observable state.
        assert!(!shared.snapshot().is_loading);
        assert!(!shared.complete_if_current(id));
        assert!(shared.begin_request().is_none());
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let state = SessionState {
            is_loading: true,
            last_error: Some("boom".into()),
            active_request: Some(RequestId(3)),
        };
        let json = serde_json::to_value(&state).expect("state should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "isLoading": true,
                "lastError": "boom",
                "activeRequest": 3,
            })
        );
    }

    #[test]
    fn test_result_serializes_tagged() {
        let success = ExtractionResult::Success {
            title: "Song".into(),
            stream_url: "https://cdn/x.mp4".into(),
        };
        let json = serde_json::to_value(&success).expect("result should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "status": "success",
                "title": "Song",
                "streamUrl": "https://cdn/x.mp4",
            })
        );
    }
}
