use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, trace, warn};

use super::fault::FaultReporter;
use super::state::SessionShared;
use super::{ExtractCallback, ExtractionResult};
use crate::common::types::{AnyError, RequestId};
use crate::configs::PlayerConfig;
use crate::player::{MediaPlayer, PlayerFactory, PlayerListener};
use crate::resolver::{ResolveOutcome, StreamResolver, resolve_first_stream};

pub(crate) enum SessionCommand {
    Extract {
        request: RequestId,
        url: String,
        callback: Box<dyn ExtractCallback>,
    },
    Completed {
        request: RequestId,
        outcome: ResolveOutcome,
    },
    Faulted {
        request: RequestId,
        error: AnyError,
    },
    AttachListener(Box<dyn PlayerListener>),
    Release,
}

struct Inflight {
    request: RequestId,
    cancel: Arc<AtomicBool>,
}

/// The UI-owning execution context of a session.
///
/// A single task that serializes every player and presentation mutation.
/// Blocking resolution never runs here; it is dispatched to the blocking
/// pool and its result posted back into the same command channel.
pub(crate) struct SessionWorker {
    shared: Arc<SessionShared>,
    commands: flume::Receiver<SessionCommand>,
    /// Clone handed to resolution tasks so results loop back to us.
    self_tx: flume::Sender<SessionCommand>,
    resolver: Arc<dyn StreamResolver>,
    http: reqwest::blocking::Client,
    factory: Box<dyn PlayerFactory>,
    config: PlayerConfig,
    faults: Arc<dyn FaultReporter>,
    player: Option<Box<dyn MediaPlayer>>,
    pending: Option<(RequestId, Box<dyn ExtractCallback>)>,
    pending_listeners: Vec<Box<dyn PlayerListener>>,
    inflight: Option<Inflight>,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        shared: Arc<SessionShared>,
        commands: flume::Receiver<SessionCommand>,
        self_tx: flume::Sender<SessionCommand>,
        resolver: Arc<dyn StreamResolver>,
        http: reqwest::blocking::Client,
        factory: Box<dyn PlayerFactory>,
        config: PlayerConfig,
        faults: Arc<dyn FaultReporter>,
    ) -> Self {
        Self {
            shared,
            commands,
            self_tx,
            resolver,
            http,
            factory,
            config,
            faults,
            player: None,
            pending: None,
            pending_listeners: Vec::new(),
            inflight: None,
        }
    }

    pub(crate) async fn run(mut self) {
        while let Ok(command) = self.commands.recv_async().await {
            match command {
                SessionCommand::Extract {
                    request,
                    url,
                    callback,
                } => self.handle_extract(request, url, callback),
                SessionCommand::Completed { request, outcome } => {
                    self.handle_completed(request, outcome)
                }
                SessionCommand::Faulted { request, error } => self.handle_fault(request, error),
                SessionCommand::AttachListener(listener) => self.handle_listener(listener),
                SessionCommand::Release => {
                    self.handle_release();
                    break;
                }
            }
        }
    }

    fn handle_extract(
        &mut self,
        request: RequestId,
        url: String,
        callback: Box<dyn ExtractCallback>,
    ) {
        // Currency check plus loading re-assertion in one step.
        if !self.shared.start_if_current(request) {
            trace!(
                session = %self.shared.session_id,
                %request, "request superseded or released before start"
            );
            return;
        }

        self.shared.clear_error();
        self.ensure_player();
        if let Some(player) = self.player.as_mut() {
            if player.is_playing() {
                // Stop before re-preparing to avoid overlapping sessions.
                player.stop();
            }
        }

        if let Some(flight) = self.inflight.take() {
            trace!(
                session = %self.shared.session_id,
                request = %flight.request, "cancelling superseded request"
            );
            flight.cancel.store(true, Ordering::Release);
        }
        self.pending = Some((request, callback));

        let cancel = Arc::new(AtomicBool::new(false));
        self.inflight = Some(Inflight {
            request,
            cancel: cancel.clone(),
        });

        debug!(
            session = %self.shared.session_id,
            %request, resolver = self.resolver.name(), %url, "resolving stream"
        );

        let resolver = self.resolver.clone();
        let http = self.http.clone();
        let join = tokio::task::spawn_blocking(move || {
            resolve_first_stream(resolver.as_ref(), &http, &url, &cancel)
        });

        let results = self.self_tx.clone();
        tokio::spawn(async move {
            match join.await {
                Ok(outcome) => {
                    let _ = results.send(SessionCommand::Completed { request, outcome });
                }
                Err(e) if e.is_panic() => {
                    let _ = results.send(SessionCommand::Faulted {
                        request,
                        error: Box::new(e),
                    });
                }
                Err(_) => {} // runtime shutting down
            }
        });
    }

    fn handle_completed(&mut self, request: RequestId, outcome: ResolveOutcome) {
        // The staleness decision and the loading flip are one atomic
        // step, so a concurrent extract either supersedes this result
        // entirely or observes it as already terminal.
        if !self.shared.complete_if_current(request) {
            trace!(
                session = %self.shared.session_id,
                %request, "stale result discarded"
            );
            return;
        }

        self.inflight = None;
        let callback = self.take_callback(request);

        match outcome {
            ResolveOutcome::Cancelled => {
                trace!(
                    session = %self.shared.session_id,
                    %request, "resolution cancelled"
                );
            }
            ResolveOutcome::Resolved(ExtractionResult::Success { title, stream_url }) => {
                self.shared.clear_error();
                if let Some(player) = self.player.as_mut() {
                    player.set_media(&stream_url);
                    player.prepare();
                    player.set_play_when_ready(self.config.autoplay);
                }
                info!(
                    session = %self.shared.session_id,
                    %request, %title, "stream resolved"
                );
                if let Some(cb) = callback {
                    cb.on_success(&title);
                }
            }
            ResolveOutcome::Resolved(ExtractionResult::Failure { error_message }) => {
                self.shared.set_error(error_message.clone());
                warn!(
                    session = %self.shared.session_id,
                    %request, "extraction failed: {}", error_message
                );
                if let Some(cb) = callback {
                    cb.on_error(&error_message);
                }
            }
        }
    }

    fn handle_fault(&mut self, request: RequestId, error: AnyError) {
        self.faults.report("stream resolution task panicked", &error);

        // Defect-class faults are not converted into a Failure result,
        // but the active request still counts as completed.
        if self.shared.complete_if_current(request) {
            self.inflight = None;
            let _ = self.take_callback(request);
        }
    }

    fn handle_listener(&mut self, listener: Box<dyn PlayerListener>) {
        match self.player.as_mut() {
            Some(player) => player.add_listener(listener),
            None => self.pending_listeners.push(listener),
        }
    }

    fn handle_release(&mut self) {
        if let Some(flight) = self.inflight.take() {
            flight.cancel.store(true, Ordering::Release);
        }
        self.pending = None;
        self.pending_listeners.clear();
        if let Some(mut player) = self.player.take() {
            player.release();
        }
        info!(session = %self.shared.session_id, "session released");
    }

    fn ensure_player(&mut self) {
        if self.player.is_none() {
            debug!(session = %self.shared.session_id, "creating playback engine");
            let mut player = self.factory.create();
            for listener in self.pending_listeners.drain(..) {
                player.add_listener(listener);
            }
            self.player = Some(player);
        }
    }

    fn take_callback(&mut self, request: RequestId) -> Option<Box<dyn ExtractCallback>> {
        match self.pending.take() {
            Some((id, cb)) if id == request => Some(cb),
            other => {
                self.pending = other;
                None
            }
        }
    }
}
