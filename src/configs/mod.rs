pub mod base;
pub mod http;
pub mod logging;
pub mod player;

pub use base::*;
pub use http::*;
pub use logging::*;
pub use player::*;
