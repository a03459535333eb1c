//! Utility functions and helpers module
//!
//! Holds the process execution layer shared by every external tool call:
//! spawning, output capture, timeouts and error mapping.

pub mod command;

pub use command::{CommandOutput, run_command, run_command_checked};
