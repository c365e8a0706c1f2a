//! Clipboard bridge for handing strings to the automated application.
//!
//! Output paths are pasted (ctrl+v) into file dialogs instead of typed with
//! synthetic key events; pasting survives special characters that per-key
//! injection mangles. The string goes through a temporary file because xclip
//! reads its input more reliably from a file than from a pipe.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::KiprintError;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Failed to stage clipboard contents: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("xclip exited with {status}")]
    UtilityFailed { status: String },

    #[error("xclip produced unexpected output: {output}")]
    UnexpectedOutput { output: String },
}

impl KiprintError for ClipboardError {
    fn error_code(&self) -> &'static str {
        match self {
            ClipboardError::Io { .. } => "CLIPBOARD_IO_ERROR",
            ClipboardError::UtilityFailed { .. } => "CLIPBOARD_UTILITY_FAILED",
            ClipboardError::UnexpectedOutput { .. } => "CLIPBOARD_UNEXPECTED_OUTPUT",
        }
    }
}

/// Place `text` on the clipboard of the given display.
///
/// Any non-empty output from xclip, or a non-zero exit, is unrecoverable for
/// this operation.
pub fn store(display: &str, text: &str) -> Result<(), ClipboardError> {
    debug!(event = "core.clipboard.store_started", len = text.len());

    let mut staged = NamedTempFile::new()?;
    staged.write_all(text.as_bytes())?;
    staged.flush()?;

    let output = Command::new("xclip")
        .args(["-selection", "clipboard"])
        .arg(staged.path())
        .env("DISPLAY", display)
        .stdin(Stdio::null())
        .output()?;

    let mut chatter = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !chatter.is_empty() {
            chatter.push('\n');
        }
        chatter.push_str(stderr.trim());
    }

    if !output.status.success() {
        return Err(ClipboardError::UtilityFailed {
            status: output.status.to_string(),
        });
    }
    if !chatter.is_empty() {
        return Err(ClipboardError::UnexpectedOutput { output: chatter });
    }

    debug!(event = "core.clipboard.store_completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ClipboardError::UtilityFailed {
            status: "exit status: 1".to_string(),
        };
        assert_eq!(err.error_code(), "CLIPBOARD_UTILITY_FAILED");

        let err = ClipboardError::UnexpectedOutput {
            output: "noise".to_string(),
        };
        assert_eq!(err.error_code(), "CLIPBOARD_UNEXPECTED_OUTPUT");
    }
}
