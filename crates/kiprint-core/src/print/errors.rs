use crate::clipboard::ClipboardError;
use crate::display::DisplayError;
use crate::errors::KiprintError;
use crate::kicad::KicadConfigError;
use crate::pcb::PcbError;
use crate::process::ProcessError;
use crate::wait::WaitError;
use crate::x11::X11Error;

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error(transparent)]
    Pcb(#[from] PcbError),

    #[error(transparent)]
    Config(#[from] KicadConfigError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    X11(#[from] X11Error),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("Output path '{path}' is not valid UTF-8")]
    InvalidOutputPath { path: String },

    #[error("Failed to prepare output directory '{path}': {source}")]
    OutputDir {
        path: String,
        source: std::io::Error,
    },
}

impl KiprintError for PrintError {
    fn error_code(&self) -> &'static str {
        match self {
            PrintError::Pcb(e) => e.error_code(),
            PrintError::Config(e) => e.error_code(),
            PrintError::Display(e) => e.error_code(),
            PrintError::Process(e) => e.error_code(),
            PrintError::Clipboard(e) => e.error_code(),
            PrintError::X11(e) => e.error_code(),
            PrintError::Wait(e) => e.error_code(),
            PrintError::InvalidOutputPath { .. } => "PRINT_INVALID_OUTPUT_PATH",
            PrintError::OutputDir { .. } => "PRINT_OUTPUT_DIR_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            PrintError::Pcb(e) => e.is_user_error(),
            PrintError::InvalidOutputPath { .. } | PrintError::OutputDir { .. } => true,
            _ => false,
        }
    }
}
