//! Blind input injection against a non-cooperating GUI: an xdotool bridge
//! plus the window/focus waits that sequence it.

pub mod errors;
mod windows;
mod xdotool;

pub use errors::X11Error;
pub use windows::{
    DEFAULT_WINDOW_TIMEOUT, WindowSearch, wait_focused, wait_for_window, wait_not_focused,
};
pub use xdotool::{WindowId, Xdo};
