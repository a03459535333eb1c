//! Structured log helpers for the censoring pipeline.
//!
//! guardian-core only emits records through the `log` facade; the binary
//! decides where they go. These helpers keep section banners and per-item
//! status lines uniform so a log file can be scanned by phase.

use log::{error, info, warn};

/// Log a section heading, e.g. `CENSORING OPERATION STARTED`.
pub fn log_section(title: &str) {
    info!("{}", "=".repeat(60));
    info!("{title}");
    info!("{}", "=".repeat(60));
}

/// Log a subsection heading
pub fn log_subsection(title: &str) {
    info!("{}", "-".repeat(40));
    info!("{title}");
    info!("{}", "-".repeat(40));
}

/// Log a status line, routed to the level matching `status`.
pub fn log_status(status: &str, message: &str) {
    match status.to_lowercase().as_str() {
        "error" | "failed" => error!("[{}] {message}", status.to_uppercase()),
        "warning" | "degraded" => warn!("[{}] {message}", status.to_uppercase()),
        _ => info!("[{}] {message}", status.to_uppercase()),
    }
}
