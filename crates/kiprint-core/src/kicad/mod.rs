//! pcbnew configuration guard.
//!
//! pcbnew reads its print settings from `~/.config/kicad/pcbnew` at startup,
//! so the run swaps a generated configuration in and restores the user's
//! original file when it ends, on every exit path.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::KiprintError;
use crate::pcb::MAX_LAYERS;

const CONFIG_FILENAME: &str = "pcbnew";
const BACKUP_SUFFIX: &str = ".pre_print_layers";

#[derive(Debug, thiserror::Error)]
pub enum KicadConfigError {
    #[error("Could not determine the home directory")]
    HomeNotFound,

    #[error("Failed to replace pcbnew config at '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl KiprintError for KicadConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            KicadConfigError::HomeNotFound => "KICAD_HOME_NOT_FOUND",
            KicadConfigError::Io { .. } => "KICAD_CONFIG_IO_ERROR",
        }
    }
}

/// Holds the user's pcbnew config aside while a generated one is in place.
///
/// Restoration happens in `Drop`, so the original file comes back
/// byte-for-byte whether the print run completes or unwinds with an error.
pub struct ConfigGuard {
    config_path: PathBuf,
    backup_path: PathBuf,
    had_original: bool,
    restored: bool,
}

impl ConfigGuard {
    /// Install a generated config under `~/.config/kicad`.
    pub fn install(enabled_layers: &[bool; MAX_LAYERS]) -> Result<Self, KicadConfigError> {
        let config_dir = dirs::home_dir()
            .ok_or(KicadConfigError::HomeNotFound)?
            .join(".config")
            .join("kicad");
        Self::install_at(&config_dir, enabled_layers)
    }

    /// Install a generated config under an explicit directory.
    pub fn install_at(
        config_dir: &Path,
        enabled_layers: &[bool; MAX_LAYERS],
    ) -> Result<Self, KicadConfigError> {
        fs::create_dir_all(config_dir).map_err(|e| io_err(config_dir, e))?;
        let config_path = config_dir.join(CONFIG_FILENAME);
        let backup_path = config_dir.join(format!("{CONFIG_FILENAME}{BACKUP_SUFFIX}"));

        let had_original = config_path.exists();
        if had_original {
            fs::rename(&config_path, &backup_path).map_err(|e| io_err(&config_path, e))?;
        }
        fs::write(&config_path, render_config(enabled_layers))
            .map_err(|e| io_err(&config_path, e))?;

        info!(
            event = "core.kicad.config_installed",
            path = %config_path.display(),
            backed_up = had_original
        );
        Ok(Self {
            config_path,
            backup_path,
            had_original,
            restored: false,
        })
    }

    /// Put the original config back. Called from `Drop`; public so callers
    /// can surface restoration errors instead of just logging them.
    pub fn restore(&mut self) -> std::io::Result<()> {
        if self.restored {
            return Ok(());
        }
        match fs::remove_file(&self.config_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        if self.had_original {
            fs::rename(&self.backup_path, &self.config_path)?;
        }
        self.restored = true;
        info!(event = "core.kicad.config_restored", path = %self.config_path.display());
        Ok(())
    }
}

impl Drop for ConfigGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(
                event = "core.kicad.config_restore_failed",
                path = %self.config_path.display(),
                error = %e
            );
        }
    }
}

fn io_err(path: &Path, source: std::io::Error) -> KicadConfigError {
    KicadConfigError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// The print settings pcbnew must start with: color output, page frame, real
/// drill marks, single-page output, and one enable flag per layer slot.
fn render_config(enabled_layers: &[bool; MAX_LAYERS]) -> String {
    let mut out = String::new();
    out.push_str("canvas_type=2\n");
    out.push_str("RefillZonesBeforeDrc=1\n");
    out.push_str("PcbFrameFirstRunShown=1\n");
    out.push_str("PrintMonochrome=0\n");
    out.push_str("PrintPageFrame=1\n");
    out.push_str("PrintPadsDrillOpt=2\n");
    out.push_str("PrintSinglePage=1\n");
    for (index, enabled) in enabled_layers.iter().enumerate() {
        out.push_str(&format!("PlotLayer_{}={}\n", index, *enabled as u8));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcb::LayerTable;

    fn flags_for(requested: &[&str], board: &str) -> [bool; MAX_LAYERS] {
        let table = LayerTable::parse(board);
        let requested: Vec<String> = requested.iter().map(|s| s.to_string()).collect();
        table.enabled_flags(&requested)
    }

    const BOARD: &str = "  (layers
    (0 F.Cu signal)
    (31 B.Cu signal)
  )
";

    #[test]
    fn test_render_config_marks_requested_layers() {
        let flags = flags_for(&["F.Cu"], BOARD);
        let config = render_config(&flags);
        assert!(config.contains("PlotLayer_0=1\n"));
        for i in 1..MAX_LAYERS {
            assert!(config.contains(&format!("PlotLayer_{i}=0\n")));
        }
        assert!(config.contains("PrintSinglePage=1\n"));
        assert!(config.contains("PrintPadsDrillOpt=2\n"));
    }

    #[test]
    fn test_render_config_has_all_slots() {
        let config = render_config(&[false; MAX_LAYERS]);
        assert_eq!(config.matches("PlotLayer_").count(), MAX_LAYERS);
    }

    #[test]
    fn test_install_and_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, b"original pcbnew settings\n").unwrap();

        {
            let _guard = ConfigGuard::install_at(dir.path(), &[true; MAX_LAYERS]).unwrap();
            let generated = fs::read_to_string(&config_path).unwrap();
            assert!(generated.contains("PlotLayer_0=1"));
            assert!(config_path.with_file_name("pcbnew.pre_print_layers").exists());
        }

        // Byte-for-byte restoration after the guard is gone.
        let restored = fs::read(&config_path).unwrap();
        assert_eq!(restored, b"original pcbnew settings\n");
        assert!(!config_path.with_file_name("pcbnew.pre_print_layers").exists());
    }

    #[test]
    fn test_restore_runs_on_unwind() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, b"keep me\n").unwrap();

        let result = std::panic::catch_unwind(|| {
            let _guard = ConfigGuard::install_at(dir.path(), &[false; MAX_LAYERS]).unwrap();
            panic!("print run failed");
        });
        assert!(result.is_err());
        assert_eq!(fs::read(&config_path).unwrap(), b"keep me\n");
    }

    #[test]
    fn test_install_without_preexisting_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILENAME);

        {
            let _guard = ConfigGuard::install_at(dir.path(), &[false; MAX_LAYERS]).unwrap();
            assert!(config_path.exists());
        }
        // No original to restore; the generated file is simply removed.
        assert!(!config_path.exists());
    }

    #[test]
    fn test_explicit_restore_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), b"x").unwrap();

        let mut guard = ConfigGuard::install_at(dir.path(), &[false; MAX_LAYERS]).unwrap();
        guard.restore().unwrap();
        guard.restore().unwrap();
        assert_eq!(fs::read(dir.path().join(CONFIG_FILENAME)).unwrap(), b"x");
    }
}
