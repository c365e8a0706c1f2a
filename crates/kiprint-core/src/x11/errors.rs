use crate::errors::KiprintError;
use crate::wait::WaitError;

#[derive(Debug, thiserror::Error)]
pub enum X11Error {
    #[error("xdotool {command} failed with {status}")]
    CommandFailed { command: String, status: String },

    #[error("Failed to run xdotool: {source}")]
    ExecFailed { source: std::io::Error },

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("Unexpected '{title}' dialog appeared")]
    UnexpectedDialog { title: String },
}

impl X11Error {
    /// True when the error is a readiness timeout rather than a broken
    /// utility, i.e. the condition simply never showed up.
    pub fn is_timeout(&self) -> bool {
        matches!(self, X11Error::Wait(WaitError::Timeout { .. }))
    }
}

impl KiprintError for X11Error {
    fn error_code(&self) -> &'static str {
        match self {
            X11Error::CommandFailed { .. } => "X11_COMMAND_FAILED",
            X11Error::ExecFailed { .. } => "X11_EXEC_FAILED",
            X11Error::Wait(e) => e.error_code(),
            X11Error::UnexpectedDialog { .. } => "X11_UNEXPECTED_DIALOG",
        }
    }
}
