// ============================================================================
// guardian-cli/src/main.rs
// ============================================================================
//
// GUARDIAN CLI: Entry Point
//
// Parses arguments, installs the logger and dispatches to the command
// implementations. Exit codes: 0 on success (including degraded runs,
// which print a warning), 1 on any error.
//
// AI-ASSISTANT-INFO: Binary entry point and exit code handling

use clap::Parser;
use guardian_cli::{Cli, Commands, logging, run_censor, run_info, terminal};
use std::process;

fn main() {
    let cli = Cli::parse();
    terminal::init_colors();

    let rust_log = std::env::var("RUST_LOG").ok();
    let level = logging::resolve_level(cli.debug, rust_log.as_deref());
    if let Err(e) = logging::setup_logging(level, cli.log_file.as_deref()) {
        terminal::print_error(&e.to_string());
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Censor(args) => run_censor(args).map(|_| ()),
        Commands::Info(args) => run_info(args),
    };

    if let Err(e) = result {
        log::debug!("Exiting after error: {e:?}");
        terminal::print_error(&e.to_string());
        process::exit(1);
    }
}
