use clap::ArgMatches;
use tracing::info;

mod print;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        event = "cli.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
    print::handle_print_command(matches)
}
