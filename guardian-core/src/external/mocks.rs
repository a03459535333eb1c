// guardian-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and for consumers that enable the "test-mocks" feature.
#![cfg(any(test, feature = "test-mocks"))]

use super::{MediaToolkit, ToolOutput};
use crate::error::{CoreError, CoreResult};
use crate::processing::filters::FilterGraph;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One recorded call into the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    ProbeDuration(PathBuf),
    ProbeAudio(PathBuf),
    ProbeVideo(PathBuf),
    ListStreams(PathBuf),
    Extract { input: PathBuf, index: u32, output: PathBuf },
    Encode {
        input: PathBuf,
        filter: String,
        audio_map: String,
        output: PathBuf,
    },
    Copy { input: PathBuf, output: PathBuf },
    Stats { input: PathBuf, start: f64, duration: f64 },
}

/// Scriptable [`MediaToolkit`] that never launches a process.
///
/// Probe outputs default to a five second stereo 1080p clip with no embedded
/// streams. Encodes succeed and create a small dummy output file unless a
/// failure has been queued. Loudness is reported per encode attempt: the
/// n-th configured level is returned for every measurement taken after the
/// n-th encode (the last value repeats).
#[derive(Clone)]
pub struct MockToolkit {
    pub duration_output: String,
    pub audio_output: String,
    pub video_output: String,
    pub streams_json: String,
    pub probe_error: Option<String>,
    /// SRT text written by `extract_stream`; `None` makes extraction fail.
    pub embedded_srt: Option<String>,
    rms_by_attempt: Rc<RefCell<Vec<f64>>>,
    raw_stats: Rc<RefCell<Option<String>>>,
    encode_failures: Rc<RefCell<VecDeque<Option<String>>>>,
    calls: Rc<RefCell<Vec<ToolCall>>>,
}

impl Default for MockToolkit {
    fn default() -> Self {
        Self {
            duration_output: "5.000000\n".to_string(),
            audio_output: "aac|48000|2|stereo\n".to_string(),
            video_output: "1920\n1080\n30000/1001\n".to_string(),
            streams_json: r#"{"streams": []}"#.to_string(),
            probe_error: None,
            embedded_srt: None,
            rms_by_attempt: Rc::new(RefCell::new(vec![-91.0])),
            raw_stats: Rc::new(RefCell::new(None)),
            encode_failures: Rc::new(RefCell::new(VecDeque::new())),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl MockToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loudness reported after each successive encode attempt.
    pub fn with_rms_by_attempt(self, levels: Vec<f64>) -> Self {
        *self.rms_by_attempt.borrow_mut() = levels;
        self
    }

    /// Returns `text` verbatim from every `audio_stats` call.
    pub fn with_raw_stats(self, text: &str) -> Self {
        *self.raw_stats.borrow_mut() = Some(text.to_string());
        self
    }

    pub fn with_embedded_subtitles(mut self, streams_json: &str, srt: &str) -> Self {
        self.streams_json = streams_json.to_string();
        self.embedded_srt = Some(srt.to_string());
        self
    }

    /// Queues the outcome of the next encode: `Some(stderr)` fails it.
    pub fn queue_encode_result(&self, failure: Option<&str>) {
        self.encode_failures
            .borrow_mut()
            .push_back(failure.map(str::to_string));
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.borrow().clone()
    }

    pub fn encode_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ToolCall::Encode { .. }))
            .count()
    }

    pub fn copy_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ToolCall::Copy { .. }))
            .count()
    }

    /// Filter strings passed to each encode, in order.
    pub fn encoded_filters(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                ToolCall::Encode { filter, .. } => Some(filter.clone()),
                _ => None,
            })
            .collect()
    }

    /// Audio `-map` value of each encode, in order.
    pub fn encoded_audio_maps(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                ToolCall::Encode { audio_map, .. } => Some(audio_map.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ToolCall) {
        log::debug!("MockToolkit call: {call:?}");
        self.calls.borrow_mut().push(call);
    }

    fn probe(&self, output: &str) -> CoreResult<String> {
        match &self.probe_error {
            Some(message) => Err(CoreError::CommandFailed {
                command: "ffprobe (mock)".to_string(),
                status: "exit status: 1".to_string(),
                stderr: message.clone(),
            }),
            None => Ok(output.to_string()),
        }
    }

    fn write_dummy_output(output: &Path) -> CoreResult<()> {
        std::fs::write(output, b"mock media")?;
        Ok(())
    }
}

impl MediaToolkit for MockToolkit {
    fn probe_duration(&self, input: &Path) -> CoreResult<String> {
        self.record(ToolCall::ProbeDuration(input.to_path_buf()));
        self.probe(&self.duration_output)
    }

    fn probe_audio_streams(&self, input: &Path) -> CoreResult<String> {
        self.record(ToolCall::ProbeAudio(input.to_path_buf()));
        self.probe(&self.audio_output)
    }

    fn probe_video_stream(&self, input: &Path) -> CoreResult<String> {
        self.record(ToolCall::ProbeVideo(input.to_path_buf()));
        self.probe(&self.video_output)
    }

    fn list_streams(&self, input: &Path) -> CoreResult<String> {
        self.record(ToolCall::ListStreams(input.to_path_buf()));
        self.probe(&self.streams_json)
    }

    fn extract_stream(&self, input: &Path, stream_index: u32, output: &Path) -> CoreResult<()> {
        self.record(ToolCall::Extract {
            input: input.to_path_buf(),
            index: stream_index,
            output: output.to_path_buf(),
        });
        match &self.embedded_srt {
            Some(srt) => {
                std::fs::write(output, srt)?;
                Ok(())
            }
            None => Err(CoreError::CommandFailed {
                command: "ffmpeg (mock extract)".to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("Stream map '0:{stream_index}' matches no streams."),
            }),
        }
    }

    fn filter_encode(&self, input: &Path, graph: &FilterGraph, output: &Path) -> CoreResult<()> {
        self.record(ToolCall::Encode {
            input: input.to_path_buf(),
            filter: graph.as_str().to_string(),
            audio_map: graph.audio_map(),
            output: output.to_path_buf(),
        });
        match self.encode_failures.borrow_mut().pop_front().flatten() {
            Some(stderr) => {
                // A failed ffmpeg run can leave a truncated file behind.
                Self::write_dummy_output(output)?;
                Err(CoreError::CommandFailed {
                    command: "ffmpeg (mock encode)".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr,
                })
            }
            None => Self::write_dummy_output(output),
        }
    }

    fn copy_streams(&self, input: &Path, output: &Path) -> CoreResult<()> {
        self.record(ToolCall::Copy {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
        Self::write_dummy_output(output)
    }

    fn audio_stats(&self, input: &Path, start: f64, duration: f64) -> CoreResult<ToolOutput> {
        self.record(ToolCall::Stats {
            input: input.to_path_buf(),
            start,
            duration,
        });

        if let Some(text) = self.raw_stats.borrow().as_ref() {
            return Ok(ToolOutput {
                status_ok: true,
                stdout: String::new(),
                stderr: text.clone(),
            });
        }

        let attempt = self.encode_count().max(1);
        let levels = self.rms_by_attempt.borrow();
        let level = levels
            .get(attempt - 1)
            .or_else(|| levels.last())
            .copied()
            .unwrap_or(f64::NEG_INFINITY);

        Ok(ToolOutput {
            status_ok: true,
            stdout: String::new(),
            stderr: format!(
                "[Parsed_ametadata_1 @ 0x55d0c8] frame:0    pts:0       pts_time:0\n\
                 [Parsed_ametadata_1 @ 0x55d0c8] lavfi.astats.Overall.RMS_level={level:.6}\n"
            ),
        })
    }
}
