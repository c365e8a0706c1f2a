//! Output-file readiness: detecting that the automated application has
//! finished writing a file.

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::wait::{self, DEFAULT_POLL_INTERVAL, WaitError};

/// Poll until `path` exists and `pid` no longer holds an open descriptor for
/// it. The print dialog reports no completion, so "the file exists and the
/// process let go of it" is the only observable end of the export.
pub fn wait_for_file_created_by(
    pid: u32,
    path: &Path,
    timeout: Duration,
) -> Result<(), WaitError> {
    let what = format!("output file {}", path.display());
    wait::wait_until(&what, timeout, DEFAULT_POLL_INTERVAL, || {
        if !path.exists() {
            return None;
        }
        if file_open_by(pid, path) {
            debug!(event = "core.files.still_open", pid = pid, path = %path.display());
            return None;
        }
        Some(())
    })
}

/// Whether any fd of `pid` points at `path`, per /proc. Errors reading the
/// fd table (process exited, permissions) count as "not open".
fn file_open_by(pid: u32, path: &Path) -> bool {
    let Ok(target) = path.canonicalize() else {
        return false;
    };
    let Ok(entries) = std::fs::read_dir(format!("/proc/{pid}/fd")) else {
        return false;
    };
    for entry in entries.flatten() {
        if let Ok(link) = std::fs::read_link(entry.path())
            && link == target
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_existing_closed_file_is_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printed.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        // Use our own pid; the file is not among our open fds.
        let result = wait_for_file_created_by(std::process::id(), &path, Duration::from_secs(2));
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_file_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.pdf");

        let result =
            wait_for_file_created_by(std::process::id(), &path, Duration::from_millis(50));
        assert!(matches!(result, Err(WaitError::Timeout { .. })));
    }

    #[test]
    fn test_file_open_by_detects_own_fd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("held-open.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF").unwrap();

        assert!(file_open_by(std::process::id(), &path));
        drop(file);
        assert!(!file_open_by(std::process::id(), &path));
    }

    #[test]
    fn test_file_open_by_dead_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.pdf");
        std::fs::write(&path, b"x").unwrap();
        assert!(!file_open_by(u32::MAX - 1, &path));
    }
}
