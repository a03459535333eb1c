//! Temporary file management utilities.
//!
//! Each censoring run gets its own temporary directory for extracted
//! subtitles. The tempfile crate removes it on drop, so cleanup also happens
//! on every error path.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, NamedTempFile, TempDir};

/// Creates a per-run temporary directory with prefix. Auto-cleaned when dropped.
///
/// Uses `config.temp_dir` when set, otherwise the system temp directory.
pub fn create_temp_dir(config: &CoreConfig, prefix: &str) -> CoreResult<TempDir> {
    let mut builder = TempFileBuilder::new();
    builder.prefix(prefix);

    let dir = match &config.temp_dir {
        Some(base) => {
            std::fs::create_dir_all(base)?;
            builder.tempdir_in(base)?
        }
        None => builder.tempdir()?,
    };
    log::debug!("Created temp dir {}", dir.path().display());
    Ok(dir)
}

/// Creates an empty probe file in `dir` to prove it is writable. The file is
/// deleted when the returned handle drops.
pub fn create_probe_file(dir: &Path) -> CoreResult<NamedTempFile> {
    Ok(TempFileBuilder::new()
        .prefix(".guardian_write_check_")
        .tempfile_in(dir)?)
}

/// Returns a temporary file path with random suffix. Does not create the file.
pub fn create_temp_file_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    use rand::distributions::Alphanumeric;
    use rand::{Rng, thread_rng};

    let random_suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    let filename = format!("{prefix}_{random_suffix}.{extension}");
    dir.join(filename)
}
