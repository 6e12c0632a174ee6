//! Single-flight extraction-to-playback session.
//!
//! One session coordinates one-at-a-time extraction attempts: a new
//! `extract` supersedes whatever is still in flight, the superseded
//! result is discarded, and only the currently-active request ever
//! touches the player or the presentation state.

mod fault;
mod state;
mod worker;

use std::sync::Arc;

use tracing::{debug, info};

pub use fault::{FaultReporter, TracingFaultReporter};
pub use state::{ExtractionRequest, ExtractionResult, SessionState};

use self::state::SessionShared;
use self::worker::{SessionCommand, SessionWorker};
use crate::common::errors::ExtractionError;
use crate::common::http::HttpClient;
use crate::common::types::{AnyResult, SessionId};
use crate::configs::Config;
use crate::player::{PlayerFactory, PlayerListener};
use crate::resolver::StreamResolver;

/// Completion callback for one extraction attempt.
///
/// Invoked exactly once per non-stale completed request, on the
/// session's own task. Superseded and torn-down requests never invoke
/// their callback.
pub trait ExtractCallback: Send {
    fn on_success(&self, title: &str);
    fn on_error(&self, message: &str);
}

/// Handle to a running extraction session.
///
/// Dropping the handle releases the session, mirroring a hosting view
/// being detached.
pub struct ExtractionSession {
    shared: Arc<SessionShared>,
    commands: flume::Sender<SessionCommand>,
}

impl ExtractionSession {
    /// Start a session with the default fault reporter. Must be called
    /// within a tokio runtime.
    pub fn new(
        resolver: Arc<dyn StreamResolver>,
        players: Box<dyn PlayerFactory>,
        config: &Config,
    ) -> AnyResult<Self> {
        Self::with_fault_reporter(resolver, players, config, Arc::new(TracingFaultReporter))
    }

    /// Start a session with an injected reporter for defect-class faults
    /// escaping the background resolution task.
    pub fn with_fault_reporter(
        resolver: Arc<dyn StreamResolver>,
        players: Box<dyn PlayerFactory>,
        config: &Config,
        faults: Arc<dyn FaultReporter>,
    ) -> AnyResult<Self> {
        let http = HttpClient::new_blocking(&config.http)?;
        let shared = Arc::new(SessionShared::new(SessionId::generate()));
        let (commands, inbox) = flume::unbounded();

        let worker = SessionWorker::new(
            shared.clone(),
            inbox,
            commands.clone(),
            resolver,
            http,
            players,
            config.player,
            faults,
        );
        tokio::spawn(worker.run());

        info!(session = %shared.session_id, "extraction session started");
        Ok(Self { shared, commands })
    }

    /// Resolve `url` to a playable stream and load it into the player.
    ///
    /// Supersedes any in-flight request: the older request is signalled
    /// to cancel and its result, should it still arrive, is discarded
    /// without invoking its callback. The loading indicator is on from
    /// the moment this returns until the new request completes.
    pub fn extract(
        &self,
        url: impl Into<String>,
        callback: Box<dyn ExtractCallback>,
    ) -> Result<ExtractionRequest, ExtractionError> {
        let Some(request) = self.shared.begin_request() else {
            return Err(ExtractionError::SessionReleased);
        };
        let url = url.into();
        debug!(
            session = %self.shared.session_id,
            %request, %url, "extraction requested"
        );

        let command = SessionCommand::Extract {
            request,
            url,
            callback,
        };
        if self.commands.send(command).is_err() {
            self.shared.finish_loading();
            return Err(ExtractionError::SessionReleased);
        }

        Ok(ExtractionRequest::new(request))
    }

    /// Forward a listener to the player. Listeners registered before the
    /// player exists are attached when it is lazily created.
    pub fn set_player_listener(&self, listener: Box<dyn PlayerListener>) {
        let _ = self.commands.send(SessionCommand::AttachListener(listener));
    }

    /// Tear the session down: cancel the in-flight request and release
    /// the player. Idempotent; the second call is a no-op.
    pub fn release(&self) {
        if !self.shared.mark_released() {
            return;
        }
        let _ = self.commands.send(SessionCommand::Release);
    }

    /// Observable snapshot of the session state.
    pub fn state(&self) -> SessionState {
        self.shared.snapshot()
    }

    pub fn session_id(&self) -> &SessionId {
        &self.shared.session_id
    }
}

impl Drop for ExtractionSession {
    fn drop(&mut self) {
        self.release();
    }
}
