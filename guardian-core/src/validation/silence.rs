// ============================================================================
// guardian-core/src/validation/silence.rs
// ============================================================================
//
// SILENCE VERIFICATION: Measuring Muted Intervals in the Output
//
// After an encode, each mute interval of the output is run through ffmpeg's
// astats filter and the overall RMS level is compared against the run's
// threshold. A measurement that cannot be taken or parsed counts as a
// failure and is reported, never raised.
//
// AI-ASSISTANT-INFO: astats-based loudness check per mute interval

// ---- Internal crate imports ----
use crate::external::MediaToolkit;
use crate::logging::log_section;
use crate::processing::filters::StrategyLevel;
use crate::processing::profanity::MuteInterval;
use crate::utils::format_db;

// ---- External crate imports ----
use log::{debug, info, warn};
use regex::Regex;

// ---- Standard library imports ----
use std::path::Path;
use std::sync::LazyLock;

const NUMBER: &str = r"(-?inf|[-+]?nan|[-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)";

static RMS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:lavfi\.astats\.Overall\.RMS_level\s*[=:]\s*|RMS level dB:\s*){NUMBER}"
    ))
    .expect("RMS regex is valid")
});

/// Outcome of measuring one mute interval.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub start: f64,
    pub end: f64,
    /// Measured RMS in dB; `-inf` is digital silence. `None` when unmeasured.
    pub measured_db: Option<f64>,
    pub passed: bool,
    pub strategy_level: StrategyLevel,
    /// Why the measurement is missing, if it is
    pub error: Option<String>,
}

/// Extracts the last reported overall RMS level from astats output.
///
/// Both the per-frame metadata lines (`lavfi.astats.Overall.RMS_level=X`
/// or `: X`) and the end-of-stream summary (`RMS level dB: X`) are accepted.
/// The summary prints per-channel values before the overall one, so the last
/// match is the overall level.
pub fn parse_rms_level(output: &str) -> Option<f64> {
    let raw = RMS_LINE
        .captures_iter(output)
        .filter_map(|c| c.get(1))
        .last()?
        .as_str()
        .to_ascii_lowercase();

    match raw.as_str() {
        "-inf" => Some(f64::NEG_INFINITY),
        "inf" => Some(f64::INFINITY),
        value if value.contains("nan") => None,
        value => value.parse().ok(),
    }
}

/// Compares interval loudness against a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceVerifier {
    threshold_db: f64,
}

impl SilenceVerifier {
    pub fn new(threshold_db: f64) -> Self {
        Self { threshold_db }
    }

    /// Measures one interval of `output`.
    pub fn verify<T: MediaToolkit + ?Sized>(
        &self,
        toolkit: &T,
        output: &Path,
        interval: &MuteInterval,
        level: StrategyLevel,
    ) -> VerificationResult {
        let mut result = VerificationResult {
            start: interval.start,
            end: interval.end,
            measured_db: None,
            passed: false,
            strategy_level: level,
            error: None,
        };

        let stats = match toolkit.audio_stats(output, interval.start, interval.duration()) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Loudness measurement failed for [{:.3}-{:.3}]: {e}", interval.start, interval.end);
                result.error = Some(format!("measurement failed: {e}"));
                return result;
            }
        };
        if !stats.status_ok {
            debug!("astats run exited unsuccessfully; parsing whatever it printed");
        }

        match parse_rms_level(&stats.combined()) {
            Some(db) => {
                result.measured_db = Some(db);
                result.passed = db <= self.threshold_db;
                info!(
                    "Segment [{:.3}-{:.3}] RMS level {} (threshold {:.1} dB): {}",
                    interval.start,
                    interval.end,
                    format_db(Some(db)),
                    self.threshold_db,
                    if result.passed { "PASS" } else { "FAIL" }
                );
            }
            None => {
                warn!(
                    "Could not parse RMS level for [{:.3}-{:.3}]",
                    interval.start, interval.end
                );
                result.error = Some("unparseable loudness statistics".to_string());
            }
        }
        result
    }

    /// Measures every interval of `output` in order.
    pub fn verify_all<T: MediaToolkit + ?Sized>(
        &self,
        toolkit: &T,
        output: &Path,
        intervals: &[MuteInterval],
        level: StrategyLevel,
    ) -> Vec<VerificationResult> {
        log_section("SILENCE VERIFICATION");
        info!("Strategy {level}: checking {} segments", intervals.len());
        intervals
            .iter()
            .map(|interval| self.verify(toolkit, output, interval, level))
            .collect()
    }
}
