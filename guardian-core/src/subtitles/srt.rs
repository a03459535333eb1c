//! SRT (SubRip) parsing and dialogue text normalization.
//!
//! Each SRT block is a numeric index, a timing line in
//! `HH:MM:SS,mmm --> HH:MM:SS,mmm` form and one or more text lines, separated
//! from the next block by a blank line. Parsing is lenient: a broken block is
//! skipped and the rest of the file is still used.

use super::SubtitleSegment;
use crate::error::{CoreError, CoreResult};

use log::debug;
use regex::Regex;

use std::path::Path;
use std::sync::LazyLock;

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{1,2}):(\d{1,2})(?:[,.](\d{1,3}))?$").expect("timestamp regex is valid")
});
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup regex is valid"));
static ASS_OVERRIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\\[^}]*\}").expect("override regex is valid"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s']").expect("punctuation regex is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Parses one SRT timestamp into seconds. Accepts `,` or `.` before the
/// milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<f64> {
    let caps = TIMESTAMP.captures(raw.trim())?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    let millis: f64 = match caps.get(4) {
        // "5" after the separator means 500 ms
        Some(m) => format!("{:0<3}", m.as_str()).parse().ok()?,
        None => 0.0,
    };
    Some(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0)
}

/// Parses a timing line, ignoring any position hints after the end timestamp.
fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start)?, parse_timestamp(end)?))
}

/// Normalizes dialogue for matching: markup removed, punctuation other than
/// apostrophes dropped, whitespace collapsed, lowercased.
///
/// ```
/// use guardian_core::subtitles::srt::clean_subtitle_text;
///
/// assert_eq!(clean_subtitle_text("What the f*ck?!"), "what the fck");
/// assert_eq!(clean_subtitle_text("<i>Don't</i> move!"), "don't move");
/// ```
pub fn clean_subtitle_text(raw: &str) -> String {
    let text = MARKUP_TAG.replace_all(raw, " ");
    let text = ASS_OVERRIDE.replace_all(&text, " ");
    let text = PUNCTUATION.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_lowercase()
}

/// Parses SRT content into segments sorted by start time.
pub fn parse_srt(content: &str) -> Vec<SubtitleSegment> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

    let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];
    for line in normalized.lines() {
        if line.trim().is_empty() {
            if blocks.last().is_some_and(|b| !b.is_empty()) {
                blocks.push(Vec::new());
            }
        } else if let Some(current) = blocks.last_mut() {
            current.push(line);
        }
    }

    let mut segments: Vec<SubtitleSegment> = blocks
        .iter()
        .filter(|b| !b.is_empty())
        .zip(1u32..)
        .filter_map(|(block, ordinal)| parse_block(block, ordinal))
        .collect();

    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    segments
}

fn parse_block(lines: &[&str], ordinal: u32) -> Option<SubtitleSegment> {
    let Some(timing_pos) = lines.iter().position(|l| l.contains("-->")) else {
        debug!("Skipping subtitle block {ordinal}: no timing line");
        return None;
    };

    let index = timing_pos
        .checked_sub(1)
        .and_then(|i| lines[i].trim().parse().ok())
        .unwrap_or(ordinal);

    let Some((start, end)) = parse_timing_line(lines[timing_pos]) else {
        debug!("Skipping subtitle block {index}: bad timing '{}'", lines[timing_pos].trim());
        return None;
    };
    if end <= start {
        debug!("Skipping subtitle block {index}: end {end} is not after start {start}");
        return None;
    }

    let raw_text = lines[timing_pos + 1..]
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n");
    if raw_text.is_empty() {
        debug!("Skipping subtitle block {index}: no text");
        return None;
    }

    let cleaned_text = clean_subtitle_text(&raw_text);
    Some(SubtitleSegment {
        index,
        start,
        end,
        raw_text,
        cleaned_text,
    })
}

/// Reads and parses an SRT file. Invalid UTF-8 is replaced rather than rejected.
pub fn load_segments(path: &Path) -> CoreResult<Vec<SubtitleSegment>> {
    let bytes = std::fs::read(path).map_err(|e| {
        CoreError::SubtitleParse(format!("cannot read {}: {e}", path.display()))
    })?;
    let segments = parse_srt(&String::from_utf8_lossy(&bytes));
    debug!("Parsed {} subtitle segments from {}", segments.len(), path.display());
    Ok(segments)
}
