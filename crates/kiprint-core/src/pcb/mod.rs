//! Layer table extraction from `.kicad_pcb` files.
//!
//! The board file carries a `(layers ...)` block whose entries look like
//! `(0 F.Cu signal)`. Only the index and the name matter here; the block is
//! scanned line by line and ends at a line holding a lone `)`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::errors::KiprintError;

/// pcbnew models boards with this fixed number of layer slots.
pub const MAX_LAYERS: usize = 50;

static BLOCK_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\(layers").expect("Invalid layer block regex"));
static BLOCK_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+\)$").expect("Invalid block close regex"));
static LAYER_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+\((\d+)\s+(\S+)").expect("Invalid layer entry regex"));

#[derive(Debug, thiserror::Error)]
pub enum PcbError {
    #[error("Failed to read PCB file '{path}': {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
}

impl KiprintError for PcbError {
    fn error_code(&self) -> &'static str {
        match self {
            PcbError::ReadFailed { .. } => "PCB_READ_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}

/// Index-to-name mapping for the board's layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerTable {
    names: Vec<Option<String>>,
}

impl LayerTable {
    pub fn parse_file(path: &Path) -> Result<Self, PcbError> {
        let text = std::fs::read_to_string(path).map_err(|source| PcbError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Scan the board text for the first `(layers ...)` block.
    pub fn parse(text: &str) -> Self {
        let mut names = vec![None; MAX_LAYERS];
        let mut collecting = false;
        for line in text.lines() {
            if !collecting {
                if BLOCK_OPEN.is_match(line) {
                    collecting = true;
                }
                continue;
            }
            if let Some(caps) = LAYER_ENTRY.captures(line) {
                let index: usize = caps[1].parse().unwrap_or(MAX_LAYERS);
                if index < MAX_LAYERS {
                    names[index] = Some(caps[2].to_string());
                } else {
                    warn!(
                        event = "core.pcb.layer_index_out_of_range",
                        index = &caps[1],
                        name = &caps[2]
                    );
                }
            } else if BLOCK_CLOSE.is_match(line) {
                break;
            }
        }
        Self { names }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|slot| slot.as_deref() == Some(name))
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).and_then(|slot| slot.as_deref())
    }

    /// Named entries in index order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_deref().map(|name| (i, name)))
    }

    pub fn is_empty(&self) -> bool {
        self.names.iter().all(Option::is_none)
    }

    /// One enable flag per layer slot for the requested layer names.
    ///
    /// A requested name missing from the table is reported and skipped; the
    /// corresponding flag stays unset and the run continues.
    pub fn enabled_flags(&self, requested: &[String]) -> [bool; MAX_LAYERS] {
        let mut flags = [false; MAX_LAYERS];
        for layer in requested {
            match self.index_of(layer) {
                Some(index) => flags[index] = true,
                None => warn!(event = "core.pcb.unknown_layer", layer = %layer),
            }
        }
        flags
    }
}
