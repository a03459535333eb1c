//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Runs the censoring pipeline on a file or directory.
pub mod censor;

/// Prints extracted video metadata.
pub mod info;
