//! Core censoring logic and orchestration.
//!
//! [`profanity`] turns subtitle segments into mute intervals, [`filters`]
//! turns intervals into ffmpeg audio filter graphs, and [`censor`] runs the
//! whole pipeline with strategy escalation.

/// Pipeline orchestration and escalation
pub mod censor;

/// Audio filter graph construction per strategy level
pub mod filters;

/// Word matching and interval merging
pub mod profanity;

pub use censor::{CensorOutcome, CensorProcessor, Completion, RunState, StepEvent, transition};
pub use filters::{FilterGraph, FilterOptions, StrategyLevel, build_filter_graph};
pub use profanity::{MuteInterval, ProfanityPattern, TextMatcher, find_mute_intervals, merge_intervals};
