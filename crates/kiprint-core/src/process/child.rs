use std::process::{Child, Command};
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::process::errors::ProcessError;

/// How long a child gets to exit after SIGTERM before escalating.
const TERM_GRACE: Duration = Duration::from_secs(3);
/// How long to wait for the child to die after SIGKILL.
const KILL_GRACE: Duration = Duration::from_secs(10);
const REAP_INTERVAL: Duration = Duration::from_millis(100);

/// A spawned helper process tied to a scope.
///
/// Every external process of the automation (Xvfb, window manager, VNC
/// server, recorder, pcbnew itself) is held in one of these. Dropping the
/// handle terminates the process: SIGTERM first, escalating to SIGKILL if it
/// is still alive after a short grace period. Fluxbox in particular is known
/// to ignore SIGTERM, so the escalation path is exercised routinely.
pub struct ScopedChild {
    role: String,
    child: Child,
    reaped: bool,
}

impl ScopedChild {
    /// Spawn `command` and take ownership of the resulting process.
    pub fn spawn(role: &str, command: &mut Command) -> Result<Self, ProcessError> {
        let child = command
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                role: role.to_string(),
                command: format!("{:?}", command.get_program()),
                source,
            })?;
        debug!(
            event = "core.process.spawned",
            role = role,
            pid = child.id()
        );
        Ok(Self {
            role: role.to_string(),
            child,
            reaped: false,
        })
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Send SIGTERM without waiting.
    pub fn terminate(&self) -> Result<(), ProcessError> {
        signal::kill(Pid::from_raw(self.child.id() as i32), Signal::SIGTERM).map_err(|e| {
            ProcessError::SignalFailed {
                role: self.role.clone(),
                pid: self.child.id(),
                message: e.to_string(),
            }
        })
    }

    /// Terminate the process and reap it, escalating to SIGKILL after a
    /// grace period. Idempotent; safe to call on an already-dead child.
    pub fn shutdown(&mut self) -> Result<(), ProcessError> {
        if self.reaped {
            return Ok(());
        }
        if self.reap_once()? {
            return Ok(());
        }

        debug!(
            event = "core.process.terminate_started",
            role = %self.role,
            pid = self.child.id()
        );
        // The child may exit between the liveness check and the signal;
        // ESRCH here is not a failure.
        if let Err(e) = self.terminate() {
            debug!(event = "core.process.terminate_signal_failed", role = %self.role, error = %e);
        }
        if self.reap_within(TERM_GRACE)? {
            debug!(event = "core.process.terminate_completed", role = %self.role);
            return Ok(());
        }

        warn!(
            event = "core.process.kill_escalated",
            role = %self.role,
            pid = self.child.id()
        );
        self.child
            .kill()
            .map_err(|source| ProcessError::SignalFailed {
                role: self.role.clone(),
                pid: self.child.id(),
                message: source.to_string(),
            })?;
        if self.reap_within(KILL_GRACE)? {
            return Ok(());
        }
        Err(ProcessError::Unkillable {
            role: self.role.clone(),
            pid: self.child.id(),
        })
    }

    fn reap_once(&mut self) -> Result<bool, ProcessError> {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    event = "core.process.exited",
                    role = %self.role,
                    status = %status
                );
                self.reaped = true;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(source) => Err(ProcessError::WaitFailed {
                role: self.role.clone(),
                source,
            }),
        }
    }

    fn reap_within(&mut self, grace: Duration) -> Result<bool, ProcessError> {
        let deadline = Instant::now() + grace;
        loop {
            if self.reap_once()? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(REAP_INTERVAL);
        }
    }
}

impl Drop for ScopedChild {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(
                event = "core.process.drop_shutdown_failed",
                role = %self.role,
                error = %e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Stdio;

    fn sleep_child(role: &str) -> ScopedChild {
        let mut cmd = Command::new("sleep");
        cmd.arg("30").stdout(Stdio::null()).stderr(Stdio::null());
        ScopedChild::spawn(role, &mut cmd).expect("Failed to spawn sleep")
    }

    #[test]
    fn test_spawn_failure() {
        let mut cmd = Command::new("definitely-not-a-real-binary-xyz");
        let result = ScopedChild::spawn("bogus", &mut cmd);
        assert!(matches!(result, Err(ProcessError::SpawnFailed { .. })));
    }

    #[test]
    fn test_shutdown_terminates_child() {
        let mut child = sleep_child("sleeper");
        let pid = child.pid();
        child.shutdown().expect("shutdown failed");

        // The pid must no longer refer to a live process (it may linger as
        // nothing since we reaped it ourselves).
        let alive = signal::kill(Pid::from_raw(pid as i32), None).is_ok();
        assert!(!alive);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut child = sleep_child("sleeper");
        child.shutdown().expect("first shutdown failed");
        child.shutdown().expect("second shutdown failed");
    }

    #[test]
    fn test_shutdown_after_natural_exit() {
        let mut cmd = Command::new("true");
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        let mut child = ScopedChild::spawn("short-lived", &mut cmd).unwrap();
        std::thread::sleep(Duration::from_millis(200));
        child.shutdown().expect("shutdown of exited child failed");
    }

    #[test]
    fn test_drop_reaps_child() {
        let pid;
        {
            let child = sleep_child("sleeper");
            pid = child.pid();
        }
        let alive = signal::kill(Pid::from_raw(pid as i32), None).is_ok();
        assert!(!alive);
    }
}
