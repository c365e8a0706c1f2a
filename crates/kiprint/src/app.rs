use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("kiprint")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Print KiCad PCB layers to PDF by driving pcbnew in a virtual X display")
        .long_about(
            "kiprint starts an isolated Xvfb display, launches pcbnew on the given board, \
            and walks its File -> Print dialogs with synthetic keystrokes to export the \
            requested layers as a single PDF. The user's pcbnew configuration is backed up \
            and restored around the run.",
        )
        .arg(
            Arg::new("pcb_file")
                .help("KiCad PCB file (.kicad_pcb)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output_dir")
                .help("Directory the PDF (and optional screencast) is written to")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("layers")
                .help("Layer names to include, as listed in the board's layers block")
                .required(true)
                .num_args(1..)
                .index(3),
        )
        .arg(
            Arg::new("record")
                .long("record")
                .short('r')
                .help("Record the UI automation to a screencast next to the output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("rec_width")
                .long("rec_width")
                .help("Virtual display / recording width")
                .value_parser(value_parser!(u32))
                .default_value("1366"),
        )
        .arg(
            Arg::new("rec_height")
                .long("rec_height")
                .help("Virtual display / recording height")
                .value_parser(value_parser!(u32))
                .default_value("960"),
        )
        .arg(
            Arg::new("output_name")
                .long("output_name")
                .short('o')
                .help("Name of the output file")
                .default_value("printed.pdf"),
        )
        .arg(
            Arg::new("vnc")
                .long("vnc")
                .help("Serve the virtual display over localhost VNC for live monitoring")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("use_wm")
                .long("use_wm")
                .help("Run a window manager inside the virtual display")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pause")
                .long("pause")
                .help("Pause for a keypress on stdin before each scripted dialog step")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
}
