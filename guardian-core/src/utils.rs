//! Utility functions for formatting and path handling.
//!
//! General-purpose helpers used throughout guardian-core: duration
//! formatting, loudness formatting and output path derivation.

use std::path::{Path, PathBuf};

/// Formats seconds as HH:MM:SS.mmm (e.g., 3725.5 -> "01:02:05.500").
/// Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Formats a loudness measurement, e.g. "-55.30 dB" or "-inf dB".
#[must_use]
pub fn format_db(db: Option<f64>) -> String {
    match db {
        Some(v) if v.is_infinite() && v < 0.0 => "-inf dB".to_string(),
        Some(v) => format!("{v:.2} dB"),
        None => "unmeasured".to_string(),
    }
}

/// Safely extracts filename from a path with consistent error handling.
/// Returns the filename as a String, or an error if the path has no filename component.
pub fn get_filename_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// File stem of `path` as a String, or an error if there is none.
pub fn get_stem_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_stem()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get file stem for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// Derives `<dir>/<stem><suffix>.<extension>` next to `input`.
pub fn default_output_path(input: &Path, suffix: &str, extension: &str) -> crate::CoreResult<PathBuf> {
    let stem = get_stem_safe(input)?;
    let file_name = if extension.is_empty() {
        format!("{stem}{suffix}")
    } else {
        format!("{stem}{suffix}.{extension}")
    };
    Ok(input.with_file_name(file_name))
}

/// Compares two paths after resolving them, falling back to a literal
/// comparison when either does not exist yet.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
