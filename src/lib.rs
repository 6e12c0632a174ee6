pub mod common;
pub mod configs;
pub mod player;
pub mod resolver;
pub mod session;

pub use common::errors::ExtractionError;
pub use common::types::{RequestId, SessionId};
pub use configs::Config;
pub use player::{MediaPlayer, PlayerEvent, PlayerFactory, PlayerListener};
pub use resolver::{StreamExtractor, StreamResolver, VideoStream};
pub use session::{
    ExtractCallback, ExtractionRequest, ExtractionResult, ExtractionSession, FaultReporter,
    SessionState,
};
