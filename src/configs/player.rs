use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub struct PlayerConfig {
    /// Whether playback starts automatically once a resolved stream is
    /// prepared. When false the player stays paused until the embedder
    /// starts it.
    #[serde(default)]
    pub autoplay: bool,
}
