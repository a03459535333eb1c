// ============================================================================
// guardian-core/src/processing/filters.rs
// ============================================================================
//
// FILTER STRATEGY: Audio Filter Graphs for Each Escalation Level
//
// Three strategies of increasing strength are available. Each one turns the
// run's mute intervals into an ffmpeg audio filter description:
//
// - Basic:      plain volume=0 gates
// - Enhanced:   normalize to s16 stereo, volume=0 gates, hard compressor
// - Aggressive: gates, compressor and noise gate, with the gated spans
//               mixed against generated silence (needs -filter_complex)
//
// AI-ASSISTANT-INFO: Filter graph construction per strategy level

// ---- External crate imports ----
use serde::Serialize;

// ---- Internal crate imports ----
use super::profanity::MuteInterval;
use crate::config::{DEFAULT_QUOTE_CHAR, DEFAULT_SAMPLE_RATE};
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

/// Escalation level of the filter strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum StrategyLevel {
    Basic = 1,
    Enhanced = 2,
    Aggressive = 3,
}

impl StrategyLevel {
    pub const MAX: StrategyLevel = StrategyLevel::Aggressive;

    /// The next stronger level, or `None` at the top.
    pub fn next(self) -> Option<StrategyLevel> {
        match self {
            StrategyLevel::Basic => Some(StrategyLevel::Enhanced),
            StrategyLevel::Enhanced => Some(StrategyLevel::Aggressive),
            StrategyLevel::Aggressive => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyLevel::Basic => "basic",
            StrategyLevel::Enhanced => "enhanced",
            StrategyLevel::Aggressive => "aggressive",
        }
    }
}

impl From<StrategyLevel> for u8 {
    fn from(level: StrategyLevel) -> u8 {
        level.as_u8()
    }
}

impl TryFrom<u8> for StrategyLevel {
    type Error = CoreError;

    fn try_from(value: u8) -> CoreResult<Self> {
        match value {
            1 => Ok(StrategyLevel::Basic),
            2 => Ok(StrategyLevel::Enhanced),
            3 => Ok(StrategyLevel::Aggressive),
            other => Err(CoreError::Config(format!("no strategy level {other}"))),
        }
    }
}

impl fmt::Display for StrategyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} ({})", self.as_u8(), self.name())
    }
}

/// A filter description ready to hand to ffmpeg.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterGraph {
    /// Linear chain for `-af`, applied to audio stream `audio_stream` of input 0
    Simple { chain: String, audio_stream: usize },
    /// Graph for `-filter_complex`; `output_label` must be mapped
    Complex { graph: String, output_label: String },
}

impl FilterGraph {
    pub fn as_str(&self) -> &str {
        match self {
            FilterGraph::Simple { chain, .. } => chain,
            FilterGraph::Complex { graph, .. } => graph,
        }
    }

    /// Value for the audio `-map` of the encode.
    pub fn audio_map(&self) -> String {
        match self {
            FilterGraph::Simple { audio_stream, .. } => format!("0:a:{audio_stream}"),
            FilterGraph::Complex { output_label, .. } => format!("[{output_label}]"),
        }
    }
}

/// Formatting knobs that do not change the strategy itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOptions {
    pub quote_char: char,
    /// Sample rate for the generated silence source
    pub sample_rate: u32,
    /// Audio-relative index of the stream to censor (`0:a:N`)
    pub audio_stream: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            quote_char: DEFAULT_QUOTE_CHAR,
            sample_rate: DEFAULT_SAMPLE_RATE,
            audio_stream: 0,
        }
    }
}

const NORMALIZE: &str = "aformat=sample_fmts=s16:channel_layouts=stereo";
const ENHANCED_COMPRESSOR: &str = "acompressor=threshold=-20dB:ratio=20:attack=5:release=50";
const AGGRESSIVE_COMPRESSOR: &str = "acompressor=threshold=-30dB:ratio=20:attack=1:release=20";
const NOISE_GATE: &str = "agate=threshold=-90dB";
const OUTPUT_LABEL: &str = "aout";

/// Renders seconds with the shortest round-trip representation, keeping at
/// least one decimal: 1 -> "1.0", 2.5 -> "2.5".
pub fn format_seconds(value: f64) -> String {
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// `enable=` expression gating a filter to one interval.
fn gate(interval: &MuteInterval, quote: char) -> String {
    format!(
        "enable={quote}between(t,{},{}){quote}",
        format_seconds(interval.start),
        format_seconds(interval.end)
    )
}

/// One `volume=<volume>:enable=...` filter per interval.
pub fn build_volume_filters(intervals: &[MuteInterval], volume: &str, quote: char) -> Vec<String> {
    intervals
        .iter()
        .map(|interval| format!("volume={volume}:{}", gate(interval, quote)))
        .collect()
}

/// Builds the filter description for `level`.
///
/// # Errors
///
/// * `CoreError::NoFilterNeeded` - `intervals` is empty
pub fn build_filter_graph(
    intervals: &[MuteInterval],
    level: StrategyLevel,
    options: &FilterOptions,
) -> CoreResult<FilterGraph> {
    if intervals.is_empty() {
        return Err(CoreError::NoFilterNeeded);
    }
    debug_assert!(
        intervals.iter().all(|i| i.end > i.start)
            && intervals.windows(2).all(|w| w[0].end < w[1].start),
        "intervals must be merged before building filters"
    );

    let quote = options.quote_char;
    let audio_stream = options.audio_stream;
    let graph = match level {
        StrategyLevel::Basic => FilterGraph::Simple {
            chain: build_volume_filters(intervals, "0", quote).join(","),
            audio_stream,
        },
        StrategyLevel::Enhanced => {
            let mut chain = vec![NORMALIZE.to_string()];
            chain.extend(build_volume_filters(intervals, "0", quote));
            chain.push(ENHANCED_COMPRESSOR.to_string());
            FilterGraph::Simple {
                chain: chain.join(","),
                audio_stream,
            }
        }
        StrategyLevel::Aggressive => {
            let mut main = vec![NORMALIZE.to_string()];
            main.extend(build_volume_filters(intervals, "0", quote));
            main.push(AGGRESSIVE_COMPRESSOR.to_string());
            main.push(NOISE_GATE.to_string());

            let mut mix =
                vec!["[main][sil]amix=inputs=2:duration=first:dropout_transition=0:normalize=0".to_string()];
            mix.extend(build_volume_filters(intervals, "-60dB", quote));

            let graph = format!(
                "[0:a:{audio_stream}]{}[main];anullsrc=channel_layout=stereo:sample_rate={}[sil];{}[{OUTPUT_LABEL}]",
                main.join(","),
                options.sample_rate,
                mix.join(",")
            );
            FilterGraph::Complex {
                graph,
                output_label: OUTPUT_LABEL.to_string(),
            }
        }
    };

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one() -> Vec<MuteInterval> {
        vec![MuteInterval { start: 1.0, end: 2.0 }]
    }

    #[test]
    fn test_basic_level() {
        let graph = build_filter_graph(&one(), StrategyLevel::Basic, &FilterOptions::default()).unwrap();
        assert_eq!(
            graph,
            FilterGraph::Simple {
                chain: "volume=0:enable='between(t,1.0,2.0)'".to_string(),
                audio_stream: 0,
            }
        );
        assert_eq!(graph.audio_map(), "0:a:0");

        let two = vec![
            MuteInterval { start: 1.0, end: 2.0 },
            MuteInterval { start: 3.5, end: 4.25 },
        ];
        let graph = build_filter_graph(&two, StrategyLevel::Basic, &FilterOptions::default()).unwrap();
        assert_eq!(
            graph.as_str(),
            "volume=0:enable='between(t,1.0,2.0)',volume=0:enable='between(t,3.5,4.25)'"
        );
    }

    #[test]
    fn test_enhanced_level() {
        let graph = build_filter_graph(&one(), StrategyLevel::Enhanced, &FilterOptions::default()).unwrap();
        assert_eq!(
            graph.as_str(),
            "aformat=sample_fmts=s16:channel_layouts=stereo,\
             volume=0:enable='between(t,1.0,2.0)',\
             acompressor=threshold=-20dB:ratio=20:attack=5:release=50"
        );
    }

    #[test]
    fn test_aggressive_level_is_complex() {
        let options = FilterOptions {
            sample_rate: 44100,
            ..FilterOptions::default()
        };
        let graph = build_filter_graph(&one(), StrategyLevel::Aggressive, &options).unwrap();
        match graph {
            FilterGraph::Complex { graph, output_label } => {
                assert_eq!(output_label, "aout");
                assert!(graph.starts_with("[0:a:0]aformat=sample_fmts=s16:channel_layouts=stereo,volume=0:enable='between(t,1.0,2.0)'"));
                assert!(graph.contains("agate=threshold=-90dB[main]"));
                assert!(graph.contains("anullsrc=channel_layout=stereo:sample_rate=44100[sil]"));
                assert!(graph.contains("volume=-60dB:enable='between(t,1.0,2.0)'"));
                assert!(graph.ends_with("[aout]"));
            }
            other => panic!("expected complex graph, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_quote_char() {
        let options = FilterOptions {
            quote_char: '"',
            ..FilterOptions::default()
        };
        let graph = build_filter_graph(&one(), StrategyLevel::Enhanced, &options).unwrap();
        assert!(graph.as_str().contains(r#"volume=0:enable="between(t,1.0,2.0)""#));
    }

    #[test]
    fn test_enhanced_level_mutes_fully() {
        let graph = build_filter_graph(&one(), StrategyLevel::Enhanced, &FilterOptions::default()).unwrap();
        assert!(graph.as_str().contains("volume=0:enable='between(t,1.0,2.0)'"));
        assert!(!graph.as_str().contains("dB:enable"));
    }

    #[test]
    fn test_selected_audio_stream_at_every_level() {
        let options = FilterOptions {
            audio_stream: 1,
            ..FilterOptions::default()
        };
        for level in [StrategyLevel::Basic, StrategyLevel::Enhanced] {
            let graph = build_filter_graph(&one(), level, &options).unwrap();
            assert_eq!(graph.audio_map(), "0:a:1", "{level}");
        }
        let graph = build_filter_graph(&one(), StrategyLevel::Aggressive, &options).unwrap();
        assert!(graph.as_str().starts_with("[0:a:1]"));
        assert!(!graph.as_str().contains("[0:a]"));
        assert_eq!(graph.audio_map(), "[aout]");
    }

    #[test]
    fn test_empty_intervals() {
        let err = build_filter_graph(&[], StrategyLevel::Basic, &FilterOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::NoFilterNeeded));
    }

    #[test]
    fn test_level_escalation_and_conversion() {
        assert_eq!(StrategyLevel::Basic.next(), Some(StrategyLevel::Enhanced));
        assert_eq!(StrategyLevel::Aggressive.next(), None);
        assert_eq!(StrategyLevel::try_from(2).unwrap(), StrategyLevel::Enhanced);
        assert!(StrategyLevel::try_from(4).is_err());
        assert_eq!(serde_json::to_string(&StrategyLevel::Aggressive).unwrap(), "3");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(1.0), "1.0");
        assert_eq!(format_seconds(2.5), "2.5");
        assert_eq!(format_seconds(3.456), "3.456");
        assert_eq!(format_seconds(120.0), "120.0");
    }
}
