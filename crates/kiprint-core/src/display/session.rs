use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::display::errors::DisplayError;
use crate::process::ScopedChild;
use crate::wait::{self, DEFAULT_POLL_INTERVAL};

const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Name of the screencast file written next to the print output.
pub const SCREENCAST_FILENAME: &str = "pcbnew_print_layers_screencast.ogv";

/// What to stack on top of the bare framebuffer.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Serve the framebuffer over VNC (localhost only) for live monitoring.
    pub vnc: bool,
    /// Run fluxbox so dialogs get decorated and stack predictably.
    pub window_manager: bool,
    /// Record the session to this video file.
    pub record: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1366,
            height: 960,
            depth: 24,
            vnc: false,
            window_manager: false,
            record: None,
        }
    }
}

/// An isolated virtual X display with optional VNC, window manager and
/// recorder layered on top.
///
/// Children are acquired in the order Xvfb, VNC, window manager, recorder
/// and torn down strictly in reverse on every exit path, including early
/// errors during startup and unwinding.
pub struct DisplaySession {
    display: String,
    children: Vec<ScopedChild>,
}

impl DisplaySession {
    pub fn start(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let display_num = pick_free_display()?;
        info!(
            event = "core.display.session_starting",
            display = %display_num,
            width = config.width,
            height = config.height
        );

        let mut cmd = Command::new("Xvfb");
        cmd.arg(&display_num)
            .args(["-screen", "0"])
            .arg(format!("{}x{}x{}", config.width, config.height, config.depth))
            .args(["-nolisten", "tcp"])
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let xvfb = ScopedChild::spawn("xvfb", &mut cmd)?;

        // From here on, dropping `session` tears down everything spawned so
        // far, so `?` is safe on each remaining step.
        let mut session = Self {
            display: display_num,
            children: vec![xvfb],
        };
        session.wait_xserver()?;

        if config.vnc {
            let mut cmd = Command::new("x11vnc");
            cmd.args(["-display", &session.display, "-localhost"])
                .stdout(Stdio::null())
                .stderr(Stdio::null());
            let vnc = ScopedChild::spawn("x11vnc", &mut cmd)?;
            info!(
                event = "core.display.vnc_started",
                display = %session.display,
                pid = vnc.pid()
            );
            session.children.push(vnc);
        }

        if config.window_manager {
            let mut cmd = Command::new("fluxbox");
            cmd.env("DISPLAY", &session.display)
                .stdout(Stdio::null())
                .stderr(Stdio::null());
            let wm = ScopedChild::spawn("window-manager", &mut cmd)?;
            session.children.push(wm);
            session.wait_wm()?;
        }

        if let Some(video) = &config.record {
            let mut cmd = Command::new("recordmydesktop");
            cmd.args([
                "--overwrite",
                "--no-sound",
                "--no-frame",
                "--on-the-fly-encoding",
                "-o",
            ])
            .arg(video)
            .env("DISPLAY", &session.display)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
            let recorder = ScopedChild::spawn("recorder", &mut cmd)?;
            info!(event = "core.display.recording_started", video = %video.display());
            session.children.push(recorder);
        }

        Ok(session)
    }

    /// The display this session owns, e.g. `:99`. Spawn GUI children with
    /// `DISPLAY` set to this value.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Poll until the X server accepts connections.
    fn wait_xserver(&self) -> Result<(), DisplayError> {
        let probe: &[&str] = if which::which("setxkbmap").is_ok() {
            &["setxkbmap", "-query"]
        } else if which::which("xset").is_ok() {
            &["xset", "q"]
        } else {
            warn!(
                event = "core.display.no_x_probe_tool",
                "Neither setxkbmap nor xset available, cannot verify the X server"
            );
            std::thread::sleep(Duration::from_secs(2));
            return Ok(());
        };
        debug!(event = "core.display.xserver_wait", display = %self.display, probe = ?probe);
        self.wait_probe("virtual X server", probe)
    }

    /// Poll until the window manager answers queries.
    fn wait_wm(&self) -> Result<(), DisplayError> {
        if which::which("wmctrl").is_err() {
            warn!(
                event = "core.display.no_wm_probe_tool",
                "wmctrl not available, cannot verify the window manager"
            );
            std::thread::sleep(Duration::from_secs(2));
            return Ok(());
        }
        debug!(event = "core.display.wm_wait", display = %self.display);
        self.wait_probe("window manager", &["wmctrl", "-m"])
    }

    fn wait_probe(&self, what: &str, cmd: &[&str]) -> Result<(), DisplayError> {
        // A non-zero exit means "not ready yet"; failing to run the probe
        // binary at all is a hard error and aborts the wait.
        wait::wait_until(what, READY_TIMEOUT, DEFAULT_POLL_INTERVAL, || {
            let status = Command::new(cmd[0])
                .args(&cmd[1..])
                .env("DISPLAY", &self.display)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match status {
                Ok(s) if s.success() => Some(Ok(())),
                Ok(_) => None,
                Err(source) => Some(Err(DisplayError::ProbeFailed { source })),
            }
        })?
    }

    /// Shut every child down in reverse acquisition order. Returns the roles
    /// in the order they were torn down.
    fn teardown(&mut self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.children.len());
        for mut child in self.children.drain(..).rev() {
            order.push(child.role().to_string());
            if let Err(e) = child.shutdown() {
                warn!(
                    event = "core.display.teardown_child_failed",
                    role = child.role(),
                    error = %e
                );
            }
        }
        order
    }
}

impl Drop for DisplaySession {
    fn drop(&mut self) {
        let order = self.teardown();
        if !order.is_empty() {
            info!(event = "core.display.session_closed", order = ?order);
        }
    }
}

/// Find an X display number no other server is using.
fn pick_free_display() -> Result<String, DisplayError> {
    for n in 99..300 {
        if !display_in_use(n) {
            return Ok(format!(":{n}"));
        }
    }
    Err(DisplayError::NoFreeDisplay)
}

fn display_in_use(n: u32) -> bool {
    Path::new(&format!("/tmp/.X{n}-lock")).exists()
        || Path::new(&format!("/tmp/.X11-unix/X{n}")).exists()
}
