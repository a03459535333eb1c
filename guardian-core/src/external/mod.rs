// ============================================================================
// guardian-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// Every call the pipeline makes to an external media tool goes through the
// MediaToolkit trait defined here. The production implementation
// (FfmpegToolkit) shells out to ffmpeg/ffprobe; tests swap in MockToolkit.
//
// KEY COMPONENTS:
// - MediaToolkit: the probe / extract / encode / measure seam
// - ToolOutput: captured output of a measurement run
// - check_dependency: startup check that a tool is runnable
//
// AI-ASSISTANT-INFO: External tool abstraction for ffmpeg/ffprobe

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_start_error};
use crate::processing::filters::FilterGraph;
use crate::util::command::{CommandOutput, run_command};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

// ============================================================================
// SUBMODULES
// ============================================================================

/// ffmpeg/ffprobe backed implementation of [`MediaToolkit`]
pub mod ffmpeg;

/// Scriptable in-memory toolkit for tests
pub mod mocks;

pub use ffmpeg::FfmpegToolkit;

// ============================================================================
// TOOLKIT TRAIT
// ============================================================================

/// Captured output of an external tool run that is parsed rather than checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub status_ok: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// stdout followed by stderr; ffmpeg filters log to stderr, ffprobe prints to stdout.
    pub fn combined(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

impl From<CommandOutput> for ToolOutput {
    fn from(output: CommandOutput) -> Self {
        Self {
            status_ok: output.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// The narrow interface between the pipeline and the media tools.
///
/// Probe methods return the tool's raw text so the parsing rules stay in
/// [`crate::media::metadata`] and can be tested without a binary.
pub trait MediaToolkit {
    /// Container duration in seconds, as printed by the prober.
    fn probe_duration(&self, input: &Path) -> CoreResult<String>;

    /// One `codec|sample_rate|channels|layout` line per audio stream.
    fn probe_audio_streams(&self, input: &Path) -> CoreResult<String>;

    /// width, height and r_frame_rate of the first video stream, one per line.
    fn probe_video_stream(&self, input: &Path) -> CoreResult<String>;

    /// JSON stream listing with index, codec name, codec type and disposition.
    fn list_streams(&self, input: &Path) -> CoreResult<String>;

    /// Converts embedded stream `stream_index` to an SRT file at `output`.
    fn extract_stream(&self, input: &Path, stream_index: u32, output: &Path) -> CoreResult<()>;

    /// Copies video, re-encodes audio through `graph` and writes `output`.
    fn filter_encode(&self, input: &Path, graph: &FilterGraph, output: &Path) -> CoreResult<()>;

    /// Stream copy of every stream from `input` to `output`.
    fn copy_streams(&self, input: &Path, output: &Path) -> CoreResult<()>;

    /// Runs loudness statistics over `[start, start + duration)` of `input`.
    fn audio_stats(&self, input: &Path, start: f64, duration: f64) -> CoreResult<ToolOutput>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that a required external command can be started.
///
/// Runs `<cmd> -version` and reports [`CoreError::DependencyNotFound`] when the
/// binary does not exist. ffmpeg and ffprobe both accept `-version`.
///
/// # Arguments
///
/// * `cmd` - Name on PATH or path to the executable
pub fn check_dependency(cmd: &Path) -> CoreResult<()> {
    let name = cmd.display().to_string();
    let mut command = Command::new(cmd);
    command.arg("-version");

    match run_command(&mut command, &name, Some(Duration::from_secs(30))) {
        Ok(output) if output.success() => {
            log::debug!(
                "Dependency '{}' found: {}",
                name,
                output.stdout.lines().next().unwrap_or_default()
            );
            Ok(())
        }
        Ok(output) => {
            log::warn!("'{name} -version' exited with {}", output.status);
            Err(CoreError::DependencyNotFound(name))
        }
        Err(CoreError::CommandStart(_, e)) if e.kind() == io::ErrorKind::NotFound => {
            log::error!("Dependency '{name}' not found");
            Err(CoreError::DependencyNotFound(name))
        }
        Err(CoreError::CommandStart(_, e)) => Err(command_start_error(name, e)),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency() {
        let err = check_dependency(Path::new("guardian-no-such-tool")).unwrap_err();
        assert!(matches!(err, CoreError::DependencyNotFound(name) if name == "guardian-no-such-tool"));
    }

    #[test]
    fn test_tool_output_combined() {
        let output = ToolOutput {
            status_ok: true,
            stdout: String::new(),
            stderr: "RMS level dB: -60.0".to_string(),
        };
        assert_eq!(output.combined(), "RMS level dB: -60.0");
    }
}
