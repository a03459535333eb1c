// ============================================================================
// guardian-core/src/processing/profanity.rs
// ============================================================================
//
// PROFANITY MATCHING: From Subtitle Text to Mute Intervals
//
// A run compiles its word list once into a single alternation regex anchored
// on word boundaries. Each subtitle segment whose cleaned text matches
// contributes its full time span as a mute candidate; candidates are then
// merged into a sorted, non-overlapping set.
//
// KEY COMPONENTS:
// - TextMatcher: the matching seam
// - ProfanityPattern: regex implementation of TextMatcher
// - MuteInterval / merge_intervals / find_mute_intervals
//
// AI-ASSISTANT-INFO: Word-list matching and interval merging

// ---- External crate imports ----
use log::{debug, info, warn};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::subtitles::SubtitleSegment;

/// Decides whether a piece of cleaned subtitle text should be muted.
pub trait TextMatcher {
    fn matches(&self, text: &str) -> bool;
}

/// Case-insensitive, whole-word matcher built from a word list.
///
/// Entries are trimmed, lowercased and deduplicated; longer entries are tried
/// first so "son of a bitch" is preferred over "bitch". An empty list
/// produces a matcher that never matches.
#[derive(Debug, Clone)]
pub struct ProfanityPattern {
    regex: Option<Regex>,
}

impl ProfanityPattern {
    pub fn new<S: AsRef<str>>(words: &[S]) -> CoreResult<Self> {
        let mut entries: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        entries.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        entries.dedup();

        for entry in &entries {
            // Subtitle text is cleaned of punctuation before matching.
            if entry.chars().any(|c| !(c.is_alphanumeric() || c.is_whitespace() || c == '\'' || c == '_')) {
                warn!("Word list entry '{entry}' contains punctuation and can never match");
            }
        }

        if entries.is_empty() {
            warn!("Word list is empty; nothing will be muted");
            return Ok(Self { regex: None });
        }

        let alternation = entries
            .iter()
            .map(|e| regex::escape(e))
            .collect::<Vec<_>>()
            .join("|");
        let regex = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
            .case_insensitive(true)
            .build()
            .map_err(|e| CoreError::Config(format!("invalid word list pattern: {e}")))?;

        debug!("Compiled profanity pattern with {} entries", entries.len());
        Ok(Self { regex: Some(regex) })
    }
}

impl TextMatcher for ProfanityPattern {
    fn matches(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(text))
    }
}

/// A span of output audio to silence, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MuteInterval {
    pub start: f64,
    pub end: f64,
}

impl MuteInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Sorts intervals and coalesces any that overlap or touch.
///
/// The result is sorted by start, pairwise disjoint, and covers exactly the
/// union of the input. Zero-length or inverted intervals are dropped.
pub fn merge_intervals(mut intervals: Vec<MuteInterval>) -> Vec<MuteInterval> {
    intervals.retain(|i| i.end > i.start);
    intervals.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

    let mut merged: Vec<MuteInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(current) if interval.start <= current.end => {
                current.end = current.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Maps every segment whose cleaned text matches to a mute interval.
pub fn find_mute_intervals<M: TextMatcher + ?Sized>(
    segments: &[SubtitleSegment],
    matcher: &M,
) -> Vec<MuteInterval> {
    let candidates: Vec<MuteInterval> = segments
        .iter()
        .filter(|segment| {
            let hit = matcher.matches(&segment.cleaned_text);
            if hit {
                debug!(
                    "Segment {} [{:.3}-{:.3}] matched: '{}'",
                    segment.index, segment.start, segment.end, segment.cleaned_text
                );
            }
            hit
        })
        .map(|segment| MuteInterval {
            start: segment.start,
            end: segment.end,
        })
        .collect();

    let matched = candidates.len();
    let merged = merge_intervals(candidates);
    info!(
        "Found {} segments to censor ({matched} matching subtitle lines)",
        merged.len()
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::clean_subtitle_text;

    fn segment(index: u32, start: f64, end: f64, text: &str) -> SubtitleSegment {
        SubtitleSegment {
            index,
            start,
            end,
            raw_text: text.to_string(),
            cleaned_text: clean_subtitle_text(text),
        }
    }

    fn interval(start: f64, end: f64) -> MuteInterval {
        MuteInterval { start, end }
    }

    #[test]
    fn test_word_boundaries_and_case() {
        let pattern = ProfanityPattern::new(&["shit"]).unwrap();
        assert!(pattern.matches(&clean_subtitle_text("Shit!")));
        assert!(pattern.matches(&clean_subtitle_text("what the shit")));
        assert!(pattern.matches(&clean_subtitle_text("SHIT happens")));
        assert!(!pattern.matches(&clean_subtitle_text("shitty")));
        assert!(!pattern.matches(&clean_subtitle_text("this is fine")));
    }

    #[test]
    fn test_censored_spelling_does_not_match() {
        let pattern = ProfanityPattern::new(&["fuck"]).unwrap();
        assert!(!pattern.matches(&clean_subtitle_text("What the f*ck?!")));
    }

    #[test]
    fn test_phrases_and_priority() {
        let pattern = ProfanityPattern::new(&["bitch", "son of a bitch", " BITCH "]).unwrap();
        assert!(pattern.matches("you son of a bitch"));
        assert!(pattern.matches("what a Bitch"));
        assert!(!pattern.matches("damnation"));
    }

    #[test]
    fn test_empty_word_list_matches_nothing() {
        let pattern = ProfanityPattern::new::<&str>(&[]).unwrap();
        assert!(!pattern.matches("anything at all"));
        let segments = vec![segment(1, 0.0, 1.0, "anything")];
        assert!(find_mute_intervals(&segments, &pattern).is_empty());
    }

    #[test]
    fn test_merge_sorted_disjoint_and_covering() {
        let merged = merge_intervals(vec![
            interval(5.0, 6.0),
            interval(1.0, 3.0),
            interval(2.0, 4.0),
            interval(4.0, 4.5),
            interval(7.0, 7.0),
        ]);
        assert_eq!(merged, vec![interval(1.0, 4.5), interval(5.0, 6.0)]);
        for pair in merged.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let once = merge_intervals(vec![interval(3.0, 5.0), interval(0.5, 1.0), interval(4.0, 8.0)]);
        let twice = merge_intervals(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_find_mute_intervals() {
        let pattern = ProfanityPattern::new(&["damn", "hell"]).unwrap();
        let segments = vec![
            segment(1, 1.0, 2.0, "Damn it!"),
            segment(2, 1.5, 3.0, "What the hell"),
            segment(3, 4.0, 5.0, "Hello there"),
            segment(4, 6.0, 7.0, "Damnation"),
        ];
        let intervals = find_mute_intervals(&segments, &pattern);
        assert_eq!(intervals, vec![interval(1.0, 3.0)]);
    }
}
