//! The pcbnew print workflow: dialog navigation, nuisance-dialog dismissal,
//! and the options that configure a run.

mod dialogs;
pub mod errors;
mod types;
mod workflow;

pub use errors::PrintError;
pub use types::{DEFAULT_OUTPUT_NAME, DEFAULT_REC_HEIGHT, DEFAULT_REC_WIDTH, PrintOptions};
pub use workflow::print_layers;
