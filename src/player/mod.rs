//! Collaborator interface for the opaque media player.
//!
//! The session owns exactly one player instance, created lazily through a
//! [`PlayerFactory`] on the first extraction and released exactly once at
//! teardown. All player calls happen on the session's own task; the
//! trait implementations do not need to be thread-safe beyond `Send`.

use serde::Serialize;

/// Events surfaced by the player's own listener mechanism.
///
/// Playback faults (unsupported codec, decoder errors) arrive here, not
/// through the extraction session: the session only orchestrates
/// resolve-and-load, it does not supervise playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PlayerEvent {
    StateChanged { playing: bool },
    PlaybackError { message: String },
}

pub trait PlayerListener: Send {
    fn on_event(&self, event: PlayerEvent);
}

/// Minimal control surface of a stateful media player.
pub trait MediaPlayer: Send {
    fn set_media(&mut self, uri: &str);
    fn prepare(&mut self);
    fn set_play_when_ready(&mut self, play: bool);
    fn is_playing(&self) -> bool;
    fn stop(&mut self);
    fn release(&mut self);
    fn add_listener(&mut self, listener: Box<dyn PlayerListener>);
}

/// Creates player instances on demand.
pub trait PlayerFactory: Send {
    fn create(&self) -> Box<dyn MediaPlayer>;
}
