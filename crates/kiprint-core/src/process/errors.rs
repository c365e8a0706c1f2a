use crate::errors::KiprintError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to spawn {role} ('{command}'): {source}")]
    SpawnFailed {
        role: String,
        command: String,
        source: std::io::Error,
    },

    #[error("Failed to signal {role} (pid {pid}): {message}")]
    SignalFailed {
        role: String,
        pid: u32,
        message: String,
    },

    #[error("Failed to wait on {role}: {source}")]
    WaitFailed {
        role: String,
        source: std::io::Error,
    },

    #[error("{role} (pid {pid}) survived SIGKILL")]
    Unkillable { role: String, pid: u32 },
}

impl KiprintError for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::SpawnFailed { .. } => "PROCESS_SPAWN_FAILED",
            ProcessError::SignalFailed { .. } => "PROCESS_SIGNAL_FAILED",
            ProcessError::WaitFailed { .. } => "PROCESS_WAIT_FAILED",
            ProcessError::Unkillable { .. } => "PROCESS_UNKILLABLE",
        }
    }
}
