//! Virtual framebuffer sessions: Xvfb plus optional VNC, window manager and
//! screen recorder, with guaranteed LIFO teardown.

pub mod errors;
mod session;

pub use errors::DisplayError;
pub use session::{DisplayConfig, DisplaySession, SCREENCAST_FILENAME};
