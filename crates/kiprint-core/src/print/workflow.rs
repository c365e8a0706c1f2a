use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{info, warn};

use crate::clipboard;
use crate::display::{DisplayConfig, DisplaySession, SCREENCAST_FILENAME};
use crate::files;
use crate::kicad::ConfigGuard;
use crate::pcb::LayerTable;
use crate::print::dialogs;
use crate::print::errors::PrintError;
use crate::print::types::PrintOptions;
use crate::process::ScopedChild;
use crate::x11::{self, DEFAULT_WINDOW_TIMEOUT, WindowSearch, Xdo};

/// pcbnew takes a while to map its frame on a cold start.
const MAIN_WINDOW_TIMEOUT: Duration = Duration::from_secs(25);
const MAIN_WINDOW_RETRY_TIMEOUT: Duration = Duration::from_secs(5);
const FILENAME_CHOOSER_TIMEOUT: Duration = Duration::from_secs(2);
const OUTPUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Title of the system printer dialog. All GUI children run with
/// LANG=C.UTF-8, so GTK resolves its catalog to the untranslated strings and
/// the English titles are reliable.
const PRINTER_DIALOG_PATTERN: &str = "^(Print)$";
const FILENAME_CHOOSER_PATTERN: &str = "Select a filename";

/// Drive pcbnew's File -> Print workflow and return the path of the PDF.
///
/// Every dialog transition is detected by polling window titles and input
/// focus; the keystroke sequences themselves are hand-tuned to the dialog
/// layouts and are sent blind.
pub fn print_layers(options: &PrintOptions) -> Result<PathBuf, PrintError> {
    info!(
        event = "core.print.started",
        pcb = %options.pcb_file.display(),
        layers = ?options.layers
    );

    let table = LayerTable::parse_file(&options.pcb_file)?;
    if table.is_empty() {
        warn!(event = "core.print.no_layer_table", pcb = %options.pcb_file.display());
    }
    let flags = table.enabled_flags(&options.layers);
    let _config = ConfigGuard::install(&flags)?;

    let output_dir_err = |source| PrintError::OutputDir {
        path: options.output_dir.display().to_string(),
        source,
    };
    fs::create_dir_all(&options.output_dir).map_err(output_dir_err)?;
    let output_dir = options.output_dir.canonicalize().map_err(output_dir_err)?;
    let output_file = output_dir.join(&options.output_name);
    if output_file.exists() {
        fs::remove_file(&output_file).map_err(output_dir_err)?;
    }
    let output_str = output_file
        .to_str()
        .ok_or_else(|| PrintError::InvalidOutputPath {
            path: output_file.to_string_lossy().into_owned(),
        })?
        .to_string();

    let display_config = DisplayConfig {
        width: options.rec_width,
        height: options.rec_height,
        depth: 24,
        vnc: options.vnc,
        window_manager: options.use_wm,
        record: options.record.then(|| output_dir.join(SCREENCAST_FILENAME)),
    };
    let session = DisplaySession::start(&display_config)?;
    let xdo = Xdo::new(session.display());

    let mut pcbnew_cmd = Command::new("pcbnew");
    pcbnew_cmd
        .arg(&options.pcb_file)
        .env("DISPLAY", session.display())
        .env("LANG", "C.UTF-8")
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    let mut pcbnew = ScopedChild::spawn("pcbnew", &mut pcbnew_cmd)?;

    // Stage the output path before any dialog needs it.
    clipboard::store(session.display(), &output_str)?;

    wait_main_window(&xdo)?;

    info!(event = "core.print.open_print_dialog");
    pause(options);
    xdo.send_keys(&["alt+f", "p"])?;

    let print_dlg = x11::wait_for_window(&xdo, &WindowSearch::new("print dialog", "Print"))?;

    pause(options);
    // Walk from the layer list to the Print button. The color option is
    // already selected when no window manager is running.
    xdo.send_keys(&["Tab", "Tab", "Tab", "Tab", "Tab", "Tab", "Tab", "Tab", "Return"])?;

    let printer_dlg = x11::wait_for_window(
        &xdo,
        &WindowSearch::new("printer dialog", PRINTER_DIALOG_PATTERN).skip(&print_dlg[0]),
    )?;

    pause(options);
    // Printer list: Home selects print-to-file at the top, then move to the
    // output name field and open the filename chooser.
    xdo.send_keys(&["Tab", "Home", "Tab", "Return"])?;

    let chooser = x11::wait_for_window(
        &xdo,
        &WindowSearch::new("filename chooser", FILENAME_CHOOSER_PATTERN)
            .timeout(FILENAME_CHOOSER_TIMEOUT),
    )?;

    info!(event = "core.print.pasting_output_path", path = %output_str);
    pause(options);
    xdo.send_keys(&["ctrl+a", "ctrl+v", "Return"])?;
    x11::wait_not_focused(&xdo, &chooser[0], DEFAULT_WINDOW_TIMEOUT)?;

    x11::wait_for_window(
        &xdo,
        &WindowSearch::new("printer dialog", PRINTER_DIALOG_PATTERN).skip(&print_dlg[0]),
    )?;

    pause(options);
    // Format options: walk fully left so PDF is selected, then print.
    xdo.send_keys(&["Tab", "Left", "Left", "Left", "Return"])?;

    files::wait_for_file_created_by(pcbnew.pid(), &output_file, OUTPUT_TIMEOUT)?;
    info!(event = "core.print.output_created", path = %output_file.display());

    // The printer dialog usually shows up twice in the search result; the
    // second id is the live one (see the window-selection tie-break).
    let printer_win = printer_dlg.get(1).or_else(|| printer_dlg.first());
    if let Some(id) = printer_win {
        x11::wait_not_focused(&xdo, id, DEFAULT_WINDOW_TIMEOUT)?;
    }

    x11::wait_for_window(&xdo, &WindowSearch::new("print dialog", "Print"))?;
    pause(options);
    // Close button.
    xdo.send_keys(&[
        "Tab", "Tab", "Tab", "Tab", "Tab", "Tab", "Tab", "Tab", "Tab", "Tab", "Return",
    ])?;

    if let Some(id) = printer_dlg.first() {
        x11::wait_not_focused(&xdo, id, DEFAULT_WINDOW_TIMEOUT)?;
    }
    x11::wait_for_window(&xdo, &WindowSearch::new("main pcbnew window", "Pcbnew"))?;

    pcbnew.shutdown()?;
    info!(event = "core.print.completed", output = %output_file.display());
    Ok(output_file)
}

/// Wait for the main pcbnew frame. A cold start can be slow, and stale
/// application state can put a nuisance dialog in front of it, so a first
/// timeout triggers the dismissal heuristics and one short retry.
fn wait_main_window(xdo: &Xdo) -> Result<(), PrintError> {
    let search = WindowSearch::new("main pcbnew window", "Pcbnew").timeout(MAIN_WINDOW_TIMEOUT);
    match x11::wait_for_window(xdo, &search) {
        Ok(_) => Ok(()),
        Err(e) if e.is_timeout() => {
            warn!(
                event = "core.print.main_window_slow",
                "Main window did not appear, clearing nuisance dialogs and retrying"
            );
            dialogs::dismiss_already_running(xdo)?;
            dialogs::dismiss_warning(xdo)?;
            dialogs::dismiss_pcbnew_error(xdo)?;
            let retry = WindowSearch::new("main pcbnew window", "Pcbnew")
                .timeout(MAIN_WINDOW_RETRY_TIMEOUT);
            x11::wait_for_window(xdo, &retry)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Debug aid: block on stdin before the next scripted step.
fn pause(options: &PrintOptions) {
    if !options.pause_for_key {
        return;
    }
    eprintln!("Press Enter to continue");
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}
