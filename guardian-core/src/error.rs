// ============================================================================
// guardian-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Censoring Pipeline
//
// This module defines the error taxonomy used throughout guardian-core. The
// first group of variants is the pipeline taxonomy callers act on
// (MediaUnreadable, NoSubtitlesFound, NoFilterNeeded, CensoringFailed). The
// remaining variants cover process plumbing and are usually wrapped into one
// of the pipeline variants before they reach the caller.
//
// AI-ASSISTANT-INFO: Error taxonomy and helper constructors for guardian-core

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the censoring pipeline and its external-tool plumbing.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- Pipeline taxonomy ----
    /// Metadata could not be extracted (missing file, tool failure, bad output).
    #[error("Media unreadable: {0}")]
    MediaUnreadable(String),

    /// No usable subtitle source after exhausting every discovery strategy.
    #[error("No subtitles found: {0}")]
    NoSubtitlesFound(String),

    /// Zero mute intervals; the caller should copy streams instead of filtering.
    #[error("No filter needed: there are no intervals to mute")]
    NoFilterNeeded,

    /// The encode failed at the highest strategy level, or the output target is unusable.
    #[error("Censoring failed: {0}")]
    CensoringFailed(String),

    // ---- Process plumbing ----
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, io::Error),

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed waiting for '{0}': {1}")]
    CommandWait(String, io::Error),

    #[error("'{0}' timed out after {1} seconds")]
    CommandTimeout(String, u64),

    #[error("Required dependency '{0}' was not found")]
    DependencyNotFound(String),

    // ---- Parsing ----
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Subtitle parse error: {0}")]
    SubtitleParse(String),

    // ---- Configuration and paths ----
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No processable video files found")]
    NoFilesFound,

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for guardian-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a process that could not be spawned.
pub fn command_start_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] from a non-zero exit status.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status: status.to_string(),
        stderr: stderr.into(),
    }
}

/// Builds a [`CoreError::CommandWait`] for a process whose exit could not be collected.
pub fn command_wait_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), err)
}
