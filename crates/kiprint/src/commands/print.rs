use std::path::PathBuf;

use clap::ArgMatches;
use tracing::{error, info};

use kiprint_core::{KiprintError, PrintOptions, print_layers};

pub fn handle_print_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let options = options_from_matches(matches)?;

    info!(
        event = "cli.print_started",
        pcb = %options.pcb_file.display(),
        output_dir = %options.output_dir.display()
    );

    match print_layers(&options) {
        Ok(output_file) => {
            info!(event = "cli.print_completed", output = %output_file.display());
            println!("{}", output_file.display());
            Ok(())
        }
        Err(e) => {
            error!(
                event = "cli.print_failed",
                code = e.error_code(),
                error = %e
            );
            Err(Box::new(e))
        }
    }
}

fn options_from_matches(matches: &ArgMatches) -> Result<PrintOptions, Box<dyn std::error::Error>> {
    let pcb_file = matches
        .get_one::<String>("pcb_file")
        .ok_or("PCB file argument is required")?;
    let output_dir = matches
        .get_one::<String>("output_dir")
        .ok_or("Output directory argument is required")?;
    let layers: Vec<String> = matches
        .get_many::<String>("layers")
        .ok_or("At least one layer name is required")?
        .cloned()
        .collect();

    let mut options = PrintOptions::new(
        PathBuf::from(pcb_file),
        PathBuf::from(output_dir),
        layers,
    );
    if let Some(name) = matches.get_one::<String>("output_name") {
        options.output_name = name.clone();
    }
    if let Some(width) = matches.get_one::<u32>("rec_width") {
        options.rec_width = *width;
    }
    if let Some(height) = matches.get_one::<u32>("rec_height") {
        options.rec_height = *height;
    }
    options.record = matches.get_flag("record");
    options.vnc = matches.get_flag("vnc");
    options.use_wm = matches.get_flag("use_wm");
    options.pause_for_key = matches.get_flag("pause");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_cli;

    #[test]
    fn test_options_from_matches() {
        let matches = build_cli()
            .try_get_matches_from([
                "kiprint",
                "board.kicad_pcb",
                "out",
                "F.Cu",
                "B.Cu",
                "--record",
                "--vnc",
                "--pause",
            ])
            .unwrap();
        let options = options_from_matches(&matches).unwrap();
        assert_eq!(options.pcb_file, PathBuf::from("board.kicad_pcb"));
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.layers, ["F.Cu", "B.Cu"]);
        assert!(options.record);
        assert!(options.vnc);
        assert!(options.pause_for_key);
        assert!(!options.use_wm);
        assert_eq!(options.output_name, "printed.pdf");
    }
}
