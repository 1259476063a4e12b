//! Core utilities shared across the renderer workspace:
//! - Error type and result alias
//! - Logging initialization
//! - Frame timer

mod error;
mod logging;
mod timer;

pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::Timer;
