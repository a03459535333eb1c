// ============================================================================
// guardian-core/src/media/metadata.rs
// ============================================================================
//
// METADATA EXTRACTION: Duration, Audio and Video Stream Properties
//
// Turns the raw text printed by the prober into a VideoMetadata value. The
// parsing functions are separate from the toolkit calls so every rule can be
// tested against literal probe output.
//
// KEY COMPONENTS:
// - VideoMetadata / AudioStreamInfo: the extracted properties
// - FrameTiming: framerate as an exact rational, or Unknown
// - parse_* functions: one per probe output shape
// - extract_metadata: runs the three probes and assembles the result
//
// AI-ASSISTANT-INFO: Probe output parsing and metadata assembly

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::external::MediaToolkit;

// ---- External crate imports ----
use log::{debug, info, warn};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

// ---- Standard library imports ----
use std::path::Path;

// ============================================================================
// TYPES
// ============================================================================

/// Properties of the audio stream the pipeline works on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioStreamInfo {
    /// Position among the file's audio streams, as used by `0:a:N`
    pub index: usize,
    pub codec: String,
    pub sample_rate: Option<u32>,
    pub channels: u32,
    /// Layout label such as "stereo" or "5.1(side)"; empty when not reported
    pub channel_layout: String,
}

/// Framerate of the first video stream.
///
/// Stored as an exact rational so derived values are computed without
/// accumulating float error. `Unknown` covers a missing, zero or
/// non-numeric denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTiming {
    Known { numerator: u64, denominator: u64 },
    Unknown,
}

impl FrameTiming {
    /// Framerate as `N/D`, e.g. "30000/1001".
    pub fn framerate(&self) -> Option<String> {
        match self {
            FrameTiming::Known {
                numerator,
                denominator,
            } => Some(format!("{numerator}/{denominator}")),
            FrameTiming::Unknown => None,
        }
    }

    /// Frames per second rounded to three decimals, e.g. "29.970".
    pub fn fps(&self) -> Option<String> {
        match self {
            FrameTiming::Known {
                numerator,
                denominator,
            } => Some(format!("{:.3}", *numerator as f64 / *denominator as f64)),
            FrameTiming::Unknown => None,
        }
    }

    /// Duration of one frame as `D/N`, e.g. "1001/30000".
    pub fn frame_duration(&self) -> Option<String> {
        match self {
            FrameTiming::Known {
                numerator,
                denominator,
            } => Some(format!("{denominator}/{numerator}")),
            FrameTiming::Unknown => None,
        }
    }
}

impl Serialize for FrameTiming {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FrameTiming", 3)?;
        state.serialize_field("framerate", &self.framerate())?;
        state.serialize_field("fps", &self.fps())?;
        state.serialize_field("frame_duration", &self.frame_duration())?;
        state.end()
    }
}

/// Everything the pipeline needs to know about an input video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub duration_secs: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_timing: FrameTiming,
    /// `None` for inputs without a usable audio stream
    pub audio: Option<AudioStreamInfo>,
}

impl VideoMetadata {
    pub fn sample_rate(&self) -> Option<u32> {
        self.audio.as_ref().and_then(|a| a.sample_rate)
    }

    /// Audio-relative index of the selected stream; 0 without audio.
    pub fn audio_stream_index(&self) -> usize {
        self.audio.as_ref().map_or(0, |a| a.index)
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parses the duration probe output. Anything but a finite, non-negative
/// number is an error.
pub fn parse_duration(output: &str) -> CoreResult<f64> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MediaUnreadable(
            "prober reported no duration".to_string(),
        ));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(CoreError::MediaUnreadable(format!(
            "unparseable duration '{trimmed}'"
        ))),
    }
}

/// Selects the audio stream with the most channels from
/// `codec|sample_rate|channels|layout` lines.
///
/// Lines with fewer than three fields or a non-numeric channel count are
/// skipped. On a tie the first stream listed wins.
pub fn parse_audio_streams(output: &str) -> Option<AudioStreamInfo> {
    let mut best: Option<AudioStreamInfo> = None;

    // ffprobe prints one line per audio stream, so the line position is the
    // audio-relative index even when a line cannot be parsed.
    for (index, line) in output.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < 3 {
            debug!("Skipping malformed audio stream line: '{line}'");
            continue;
        }
        let Ok(channels) = fields[2].trim().parse::<u32>() else {
            debug!("Skipping audio stream with channel count '{}'", fields[2]);
            continue;
        };

        let candidate = AudioStreamInfo {
            index,
            codec: fields[0].trim().to_string(),
            sample_rate: fields[1].trim().parse().ok(),
            channels,
            channel_layout: fields.get(3).map(|s| s.trim().to_string()).unwrap_or_default(),
        };

        if best.as_ref().is_none_or(|b| candidate.channels > b.channels) {
            best = Some(candidate);
        }
    }

    best
}

/// Parses an `r_frame_rate` value.
///
/// "N/D" with a positive numerator and denominator is taken as is. A decimal
/// such as "24.0" is scaled to thousandths ("24000/1000"). Everything else is
/// [`FrameTiming::Unknown`].
pub fn parse_framerate(raw: Option<&str>) -> FrameTiming {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return FrameTiming::Unknown;
    };

    if let Some((num, den)) = raw.split_once('/') {
        return match (num.trim().parse::<u64>(), den.trim().parse::<u64>()) {
            (Ok(numerator), Ok(denominator)) if numerator > 0 && denominator > 0 => {
                FrameTiming::Known {
                    numerator,
                    denominator,
                }
            }
            _ => FrameTiming::Unknown,
        };
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => {
            let numerator = (value * 1000.0).round() as u64;
            if numerator == 0 {
                FrameTiming::Unknown
            } else {
                FrameTiming::Known {
                    numerator,
                    denominator: 1000,
                }
            }
        }
        _ => FrameTiming::Unknown,
    }
}

/// Parses the `width`, `height`, `r_frame_rate` lines of the video probe.
/// Missing trailing lines leave the corresponding values absent.
pub fn parse_video_stream(output: &str) -> (Option<u32>, Option<u32>, FrameTiming) {
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let width = lines.first().and_then(|w| w.parse().ok());
    let height = lines.get(1).and_then(|h| h.parse().ok());
    let timing = parse_framerate(lines.get(2).copied());
    (width, height, timing)
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Probes `input` and assembles its [`VideoMetadata`].
///
/// # Errors
///
/// * `CoreError::MediaUnreadable` - missing file, failed probe or a duration
///   that cannot be parsed
pub fn extract_metadata<T: MediaToolkit>(toolkit: &T, input: &Path) -> CoreResult<VideoMetadata> {
    if !input.is_file() {
        return Err(CoreError::MediaUnreadable(format!(
            "{} does not exist or is not a file",
            input.display()
        )));
    }

    let unreadable =
        |e: CoreError| CoreError::MediaUnreadable(format!("{}: {e}", input.display()));

    let duration_secs = parse_duration(&toolkit.probe_duration(input).map_err(unreadable)?)?;

    let audio = parse_audio_streams(&toolkit.probe_audio_streams(input).map_err(unreadable)?);
    if audio.is_none() {
        warn!("No usable audio stream found in {}", input.display());
    }

    let (width, height, frame_timing) =
        parse_video_stream(&toolkit.probe_video_stream(input).map_err(unreadable)?);
    if frame_timing == FrameTiming::Unknown {
        debug!("Framerate of {} is unknown", input.display());
    }

    let metadata = VideoMetadata {
        duration_secs,
        width,
        height,
        frame_timing,
        audio,
    };

    info!(
        "Video: {:.2}s, {}x{}, {} fps, audio {}",
        metadata.duration_secs,
        metadata.width.map_or("?".to_string(), |w| w.to_string()),
        metadata.height.map_or("?".to_string(), |h| h.to_string()),
        metadata.frame_timing.fps().unwrap_or_else(|| "unknown".to_string()),
        metadata
            .audio
            .as_ref()
            .map_or("none".to_string(), |a| format!("{} {}ch", a.codec, a.channels)),
    );

    Ok(metadata)
}
