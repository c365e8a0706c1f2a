use std::fmt;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::x11::errors::X11Error;

/// Opaque window handle as reported by the window system.
///
/// Only valid while the window exists; a handle for a closed window simply
/// goes stale and stops matching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowId(String);

impl WindowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(id: &str) -> Self {
        Self(id.trim().to_string())
    }
}

/// xdotool bound to one display.
pub struct Xdo {
    display: String,
}

impl Xdo {
    pub fn new(display: &str) -> Self {
        Self {
            display: display.to_string(),
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Run xdotool with the given arguments and return its stdout.
    pub fn run(&self, args: &[&str]) -> Result<String, X11Error> {
        debug!(event = "core.x11.xdotool", args = ?args);
        let output = Command::new("xdotool")
            .args(args)
            .env("DISPLAY", &self.display)
            .stderr(Stdio::null())
            .output()
            .map_err(|source| X11Error::ExecFailed { source })?;
        if !output.status.success() {
            return Err(X11Error::CommandFailed {
                command: args.join(" "),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Send literal key chords to whichever window holds input focus.
    ///
    /// There is no feedback loop confirming each keystroke; callers sequence
    /// chords against window and focus waits instead.
    pub fn send_keys(&self, chords: &[&str]) -> Result<(), X11Error> {
        let mut args = vec!["key"];
        args.extend_from_slice(chords);
        self.run(&args).map(|_| ())
    }

    /// List the visible windows whose title matches `pattern`.
    ///
    /// An empty list is not an error; xdotool reports "no match" through its
    /// exit status and that is an expected polling outcome.
    pub fn search_visible(&self, pattern: &str) -> Result<Vec<WindowId>, X11Error> {
        match self.run(&["search", "--onlyvisible", "--name", pattern]) {
            Ok(out) => Ok(out.lines().map(WindowId::from).collect()),
            Err(X11Error::CommandFailed { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Focus a window and block until the server has processed it.
    pub fn focus(&self, id: &WindowId) -> Result<(), X11Error> {
        self.run(&["windowfocus", "--sync", id.as_str()]).map(|_| ())
    }

    /// The window currently holding input focus.
    pub fn focused_window(&self) -> Result<WindowId, X11Error> {
        self.run(&["getwindowfocus"]).map(|out| WindowId::from(out.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_id_trims_whitespace() {
        let id = WindowId::from("12345\n");
        assert_eq!(id.as_str(), "12345");
        assert_eq!(id.to_string(), "12345");
    }

    #[test]
    fn test_window_id_equality() {
        assert_eq!(WindowId::from("7"), WindowId::from("7\n"));
        assert_ne!(WindowId::from("7"), WindowId::from("8"));
    }

    #[test]
    fn test_xdo_keeps_display() {
        let xdo = Xdo::new(":42");
        assert_eq!(xdo.display(), ":42");
    }
}
