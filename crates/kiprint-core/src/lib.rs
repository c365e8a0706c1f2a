//! kiprint-core: automated pcbnew layer printing.
//!
//! Drives KiCad's pcbnew through its File -> Print menu inside a virtual X
//! display, turning the manual print workflow into a scripted PDF export of
//! selected board layers.
//!
//! # Main Entry Points
//!
//! - [`print`] - The end-to-end print workflow ([`print_layers`])
//! - [`display`] - Virtual framebuffer sessions with scoped teardown
//! - [`x11`] - xdotool bridge: window waits, focus waits, keystrokes
//! - [`pcb`] - Layer table parsing from board files
//! - [`kicad`] - pcbnew config replacement with guaranteed restore

pub mod clipboard;
pub mod display;
pub mod errors;
pub mod files;
pub mod kicad;
pub mod logging;
pub mod pcb;
pub mod print;
pub mod process;
pub mod wait;
pub mod x11;

// Re-export commonly used types at crate root for convenience
pub use display::{DisplayConfig, DisplayError, DisplaySession};
pub use errors::{KiprintError, KiprintResult};
pub use pcb::{LayerTable, MAX_LAYERS, PcbError};
pub use print::{PrintError, PrintOptions, print_layers};
pub use process::{ProcessError, ScopedChild};
pub use wait::{WaitError, wait_until};
pub use x11::{WindowId, WindowSearch, X11Error, Xdo};

// Re-export logging initialization
pub use logging::init_logging;
