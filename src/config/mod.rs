//! Configuration management.
//!
//! Settings and XDG paths in the application-settings style, plus the
//! three plain-text input lists the scanner consumes.

mod inputs;
mod settings;

pub use inputs::{ensure_input_files, load_inputs, InputFiles, InputSet};
pub use settings::{Paths, ScanSettings};
