use std::path::PathBuf;

/// Default recording geometry; roomy enough for the print dialogs.
pub const DEFAULT_REC_WIDTH: u32 = 1366;
pub const DEFAULT_REC_HEIGHT: u32 = 960;
pub const DEFAULT_OUTPUT_NAME: &str = "printed.pdf";

/// Everything one print run needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    pub pcb_file: PathBuf,
    pub output_dir: PathBuf,
    /// Name of the PDF produced inside `output_dir`.
    pub output_name: String,
    /// Layer names to include, as they appear in the board's layer table.
    pub layers: Vec<String>,
    /// Record the automation to a screencast next to the output file.
    pub record: bool,
    pub rec_width: u32,
    pub rec_height: u32,
    /// Serve the virtual display over localhost VNC for live monitoring.
    pub vnc: bool,
    /// Run a window manager inside the virtual display. The keystroke
    /// sequences are tuned for the undecorated (no WM) dialog layout.
    pub use_wm: bool,
    /// Stop for a keypress on stdin before each scripted dialog step.
    pub pause_for_key: bool,
}

impl PrintOptions {
    pub fn new(pcb_file: PathBuf, output_dir: PathBuf, layers: Vec<String>) -> Self {
        Self {
            pcb_file,
            output_dir,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            layers,
            record: false,
            rec_width: DEFAULT_REC_WIDTH,
            rec_height: DEFAULT_REC_HEIGHT,
            vnc: false,
            use_wm: false,
            pause_for_key: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PrintOptions::new(
            PathBuf::from("board.kicad_pcb"),
            PathBuf::from("out"),
            vec!["F.Cu".to_string()],
        );
        assert_eq!(options.output_name, "printed.pdf");
        assert_eq!(options.rec_width, 1366);
        assert_eq!(options.rec_height, 960);
        assert!(!options.record);
        assert!(!options.pause_for_key);
    }
}
