// ============================================================================
// guardian-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern Backend for the log Facade
//
// guardian-core only emits `log` records. This module installs the backend:
// plain lines on stderr, plus an optional timestamped log file.
//
// USAGE:
// - default: info
// - --debug: debug
// - RUST_LOG=<level>: overrides both when it names a valid level
//
// AI-ASSISTANT-INFO: Logger installation and timestamp helpers

// ---- Internal crate imports ----
use crate::error::{CliErrorContext, CliResult};

// ---- External crate imports ----
use log::{Level, LevelFilter};

// ---- Standard library imports ----
use std::path::Path;

/// Picks the log level from the `--debug` flag and a `RUST_LOG` value.
pub fn resolve_level(debug: bool, rust_log: Option<&str>) -> LevelFilter {
    if let Some(level) = rust_log.and_then(|v| v.trim().parse::<LevelFilter>().ok()) {
        return level;
    }
    if debug { LevelFilter::Debug } else { LevelFilter::Info }
}

/// Installs the global logger. Can only succeed once per process.
pub fn setup_logging(level: LevelFilter, log_file: Option<&Path>) -> CliResult<()> {
    let console = fern::Dispatch::new()
        .format(|out, message, record| match record.level() {
            Level::Info => out.finish(format_args!("{message}")),
            level => out.finish(format_args!("{level}: {message}")),
        })
        .chain(std::io::stderr());

    let mut root = fern::Dispatch::new()
        .level(level)
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console);

    if let Some(path) = log_file {
        let file = fern::log_file(path)
            .cli_with_context(|| format!("Cannot open log file {}", path.display()))?;
        root = root.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} {:<5} [{}] {message}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target()
                    ))
                })
                .chain(file),
        );
    }

    root.apply()
        .map_err(|e| guardian_core::CoreError::OperationFailed(format!("Cannot install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level(false, None), LevelFilter::Info);
        assert_eq!(resolve_level(true, None), LevelFilter::Debug);
        assert_eq!(resolve_level(false, Some("trace")), LevelFilter::Trace);
        assert_eq!(resolve_level(true, Some("WARN")), LevelFilter::Warn);
        assert_eq!(resolve_level(true, Some("guardian_core=trace")), LevelFilter::Debug);
    }
}
