//! File discovery module for finding video files to process.
//!
//! Used for batch runs: searches the top level of a directory for files with
//! a known video extension (case-insensitive). Subdirectories are not
//! searched.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Extensions treated as video files.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "m4v", "webm"];

/// Checks if the given path is a video file that can be processed.
#[must_use]
pub fn is_video_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
}

/// Finds video files eligible for processing in the specified directory.
///
/// Files whose stem already ends with `skip_suffix` (earlier outputs) are
/// left out so re-running over a directory does not censor its own results.
///
/// # Arguments
///
/// * `input_dir` - The directory to search for video files
/// * `skip_suffix` - Output suffix marking files produced by a previous run
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths of the discovered videos, sorted by name
/// * `Err(CoreError::NoFilesFound)` - If no video files are found
pub fn find_processable_files(input_dir: &Path, skip_suffix: &str) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !is_video_file(&path) {
                return None;
            }
            let stem = path.file_stem()?.to_str()?;
            if !skip_suffix.is_empty() && stem.ends_with(skip_suffix) {
                log::debug!("Skipping previous output {}", path.display());
                return None;
            }
            Some(path)
        })
        .collect();

    if files.is_empty() {
        Err(CoreError::NoFilesFound)
    } else {
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_processable_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.MKV", "a.mp4", "notes.txt", "a_censored.mp4", "c.webm"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let files = find_processable_files(dir.path(), "_censored").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.MKV", "c.webm"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_processable_files(dir.path(), "_censored"),
            Err(CoreError::NoFilesFound)
        ));
    }
}
