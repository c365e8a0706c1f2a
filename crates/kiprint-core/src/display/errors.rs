use crate::errors::KiprintError;
use crate::process::ProcessError;
use crate::wait::WaitError;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("No free X display number found")]
    NoFreeDisplay,

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("Failed to probe display readiness: {source}")]
    ProbeFailed { source: std::io::Error },
}

impl KiprintError for DisplayError {
    fn error_code(&self) -> &'static str {
        match self {
            DisplayError::NoFreeDisplay => "DISPLAY_NO_FREE_NUMBER",
            DisplayError::Process(e) => e.error_code(),
            DisplayError::Wait(e) => e.error_code(),
            DisplayError::ProbeFailed { .. } => "DISPLAY_PROBE_FAILED",
        }
    }
}
