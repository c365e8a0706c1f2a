use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info};

use crate::wait::{self, DEFAULT_POLL_INTERVAL};
use crate::x11::errors::X11Error;
use crate::x11::xdotool::{WindowId, Xdo};

pub const DEFAULT_WINDOW_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters for waiting on a named window.
pub struct WindowSearch<'a> {
    /// Human-readable name used in logs and timeout errors.
    pub name: &'a str,
    /// Title regex handed to the window search.
    pub pattern: &'a str,
    pub timeout: Duration,
    /// Focus the window once found and wait until it holds focus.
    pub focus: bool,
    /// Ignore this already-known window and wait for a different one.
    pub skip: Option<&'a WindowId>,
    /// Alternative titles whose appearance aborts the wait, used to catch
    /// nuisance dialogs stealing the workflow.
    pub others: &'a [&'a str],
}

impl<'a> WindowSearch<'a> {
    pub fn new(name: &'a str, pattern: &'a str) -> Self {
        Self {
            name,
            pattern,
            timeout: DEFAULT_WINDOW_TIMEOUT,
            focus: true,
            skip: None,
            others: &[],
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn skip(mut self, id: &'a WindowId) -> Self {
        self.skip = Some(id);
        self
    }

    pub fn others(mut self, others: &'a [&'a str]) -> Self {
        self.others = others;
        self
    }
}

/// Pick the match to act on from a search result.
///
/// With more than one hit, xdotool has been observed to list a stale or
/// unrelated window first and the dialog we are after second, so the second
/// entry wins. Empirical behavior, kept as-is rather than generalized.
fn select_match(ids: &[WindowId]) -> Option<&WindowId> {
    match ids.len() {
        0 => None,
        1 => Some(&ids[0]),
        _ => Some(&ids[1]),
    }
}

/// Poll until a window matching the search appears, then optionally focus it.
///
/// Returns every id the final search reported (never empty on success);
/// callers that need to tell two same-titled dialogs apart use the
/// individual entries.
pub fn wait_for_window(xdo: &Xdo, search: &WindowSearch<'_>) -> Result<Vec<WindowId>, X11Error> {
    info!(event = "core.x11.window_wait", name = search.name, pattern = search.pattern);
    if let Some(skip) = search.skip {
        debug!(event = "core.x11.window_wait_skip", skip = %skip);
    }

    let what = format!("'{}' window", search.name);
    let outcome = wait::wait_until(&what, search.timeout, DEFAULT_POLL_INTERVAL, || {
        match probe(xdo, search) {
            Ok(Some(ids)) => Some(Ok(ids)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    });
    let ids = match outcome {
        Ok(result) => result?,
        Err(timeout) => {
            log_window_properties(xdo, None);
            return Err(timeout.into());
        }
    };

    let found = select_match(&ids).cloned();
    if let Some(id) = found {
        debug!(event = "core.x11.window_found", name = search.name, id = %id, matches = ids.len());
        if search.focus {
            xdo.focus(&id)?;
            wait_focused(xdo, &id, search.timeout)?;
        }
    }
    Ok(ids)
}

fn probe(xdo: &Xdo, search: &WindowSearch<'_>) -> Result<Option<Vec<WindowId>>, X11Error> {
    let ids = xdo.search_visible(search.pattern)?;
    if let Some(id) = select_match(&ids) {
        if search.skip != Some(id) {
            return Ok(Some(ids));
        }
        debug!(event = "core.x11.window_skipped", id = %id);
    }
    // Nothing usable yet; bail out early if a known intruder showed up.
    for other in search.others {
        if !xdo.search_visible(other)?.is_empty() {
            return Err(X11Error::UnexpectedDialog {
                title: other.to_string(),
            });
        }
    }
    Ok(None)
}

/// Poll until `id` holds input focus.
pub fn wait_focused(xdo: &Xdo, id: &WindowId, timeout: Duration) -> Result<(), X11Error> {
    debug!(event = "core.x11.focus_wait", id = %id);
    let what = format!("window {id} to get focus");
    wait::wait_until(&what, timeout, DEFAULT_POLL_INTERVAL, || {
        xdo.focused_window().ok().filter(|cur| cur == id).map(|_| ())
    })
    .map_err(|e| {
        log_window_properties(xdo, Some(id));
        e.into()
    })
}

/// Poll until `id` no longer holds input focus.
pub fn wait_not_focused(xdo: &Xdo, id: &WindowId, timeout: Duration) -> Result<(), X11Error> {
    debug!(event = "core.x11.unfocus_wait", id = %id);
    let what = format!("window {id} to lose focus");
    wait::wait_until(&what, timeout, DEFAULT_POLL_INTERVAL, || {
        xdo.focused_window().ok().filter(|cur| cur != id).map(|_| ())
    })
    .map_err(|e| {
        log_window_properties(xdo, Some(id));
        e.into()
    })
}

/// Dump a window's X properties to the debug log, best-effort. Used when a
/// wait times out to leave a trace of what was actually on screen.
fn log_window_properties(xdo: &Xdo, id: Option<&WindowId>) {
    if which::which("xprop").is_err() {
        return;
    }
    let target = match id {
        Some(id) => Some(id.clone()),
        None => xdo.focused_window().ok(),
    };
    let Some(target) = target else { return };
    if let Ok(output) = Command::new("xprop")
        .args(["-id", target.as_str()])
        .env("DISPLAY", xdo.display())
        .stderr(Stdio::null())
        .output()
    {
        debug!(
            event = "core.x11.window_properties",
            id = %target,
            props = %String::from_utf8_lossy(&output.stdout)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<WindowId> {
        raw.iter().copied().map(WindowId::from).collect()
    }

    #[test]
    fn test_select_match_empty() {
        assert!(select_match(&[]).is_none());
    }

    #[test]
    fn test_select_match_single_uses_first() {
        let list = ids(&["100"]);
        assert_eq!(select_match(&list), Some(&WindowId::from("100")));
    }

    #[test]
    fn test_select_match_multiple_uses_second() {
        let list = ids(&["100", "200", "300"]);
        assert_eq!(select_match(&list), Some(&WindowId::from("200")));
    }

    #[test]
    fn test_search_builder_defaults() {
        let search = WindowSearch::new("print dialog", "Print");
        assert_eq!(search.timeout, DEFAULT_WINDOW_TIMEOUT);
        assert!(search.focus);
        assert!(search.skip.is_none());
        assert!(search.others.is_empty());
    }

    #[test]
    fn test_search_builder_overrides() {
        let skip = WindowId::from("42");
        let others = ["Warning"];
        let search = WindowSearch::new("printer dialog", "^(Print)$")
            .timeout(Duration::from_secs(2))
            .skip(&skip)
            .others(&others);
        assert_eq!(search.timeout, Duration::from_secs(2));
        assert_eq!(search.skip, Some(&skip));
        assert_eq!(search.others, &["Warning"]);
    }
}
