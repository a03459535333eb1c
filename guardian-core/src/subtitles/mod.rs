//! Subtitle discovery and parsing.
//!
//! [`locator`] decides where the dialogue for a video comes from (a sidecar
//! file or an embedded text track) and [`srt`] turns SRT text into timed,
//! normalized segments.

pub mod locator;
pub mod srt;

pub use locator::{ResolvedSubtitles, SubtitleSource, locate_subtitles};
pub use srt::{clean_subtitle_text, load_segments, parse_srt};

use serde::Serialize;

/// One timed subtitle cue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleSegment {
    /// Block number from the source file
    pub index: u32,
    /// Seconds from the start of the video
    pub start: f64,
    pub end: f64,
    /// Text as written in the file, line breaks preserved
    pub raw_text: String,
    /// Normalized text used for matching
    pub cleaned_text: String,
}
