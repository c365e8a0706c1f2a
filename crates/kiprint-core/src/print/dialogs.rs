//! Dismissal heuristics for nuisance dialogs.
//!
//! Depending on prior application state, pcbnew may open a confirmation
//! ("already running"), a generic warning, or an error dialog before or
//! instead of its main window. Each is probed with a short timeout and
//! dismissed with Return if present; absence is a fast no-op.

use std::time::Duration;

use tracing::{info, warn};

use crate::x11::{self, WindowSearch, X11Error, Xdo};

/// The confirmation modal pcbnew opens when another instance already runs.
pub fn dismiss_already_running(xdo: &Xdo) -> Result<bool, X11Error> {
    let dismissed = dismiss(xdo, "Confirmation", Duration::from_secs(1))?;
    if dismissed {
        info!(event = "core.print.dismissed_already_running");
    }
    Ok(dismissed)
}

/// A generic warning dialog; the export usually fails after one of these,
/// but dismissing it lets the run report the real error.
pub fn dismiss_warning(xdo: &Xdo) -> Result<bool, X11Error> {
    let dismissed = dismiss(xdo, "Warning", Duration::from_secs(1))?;
    if dismissed {
        warn!(event = "core.print.dismissed_warning");
    }
    Ok(dismissed)
}

/// The "pcbnew Error" dialog shown for a broken board file.
pub fn dismiss_pcbnew_error(xdo: &Xdo) -> Result<bool, X11Error> {
    let dismissed = dismiss(xdo, "pcbnew Error", Duration::from_secs(3))?;
    if dismissed {
        warn!(event = "core.print.dismissed_pcbnew_error");
    }
    Ok(dismissed)
}

/// Probe briefly for a dialog titled `title`; focus it and send Return if it
/// is there. Returns whether anything was dismissed.
fn dismiss(xdo: &Xdo, title: &str, timeout: Duration) -> Result<bool, X11Error> {
    let search = WindowSearch::new(title, title).timeout(timeout);
    match x11::wait_for_window(xdo, &search) {
        Ok(_) => {
            xdo.send_keys(&["Return"])?;
            Ok(true)
        }
        Err(e) if e.is_timeout() => Ok(false),
        Err(e) => Err(e),
    }
}
