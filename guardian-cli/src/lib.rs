// guardian-cli/src/lib.rs
//
// Library portion of the Guardian CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{CensorArgs, Cli, Commands, InfoArgs};
pub use commands::censor::run_censor;
pub use commands::info::run_info;
