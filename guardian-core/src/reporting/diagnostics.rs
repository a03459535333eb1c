//! Diagnostic report for a censoring run
//!
//! The orchestrator fills a [`DiagnosticReport`] as the run progresses:
//! every attempted strategy level, the latest per-interval measurements,
//! and any errors or warnings. At the end it derives recommendations and the
//! report is written next to the output as
//! `<stem>_diagnostic_<YYYYmmdd_HHMMSS>.json`.

use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{error, info, warn};
use serde::{Serialize, Serializer};

use crate::error::{CoreError, CoreResult};
use crate::logging::log_section;
use crate::processing::filters::StrategyLevel;
use crate::processing::profanity::MuteInterval;
use crate::temp_files::create_temp_file_path;
use crate::utils::{format_db, get_stem_safe};
use crate::validation::VerificationResult;

/// Report message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageLevel::Info => write!(f, "INFO"),
            MessageLevel::Warning => write!(f, "WARNING"),
            MessageLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A message attached to the report
#[derive(Debug, Clone, Serialize)]
pub struct ReportMessage {
    pub level: MessageLevel,
    /// Pipeline phase the message belongs to ("encode", "verification", ...)
    pub category: String,
    pub message: String,
}

impl ReportMessage {
    pub fn info<S: Into<String>, C: Into<String>>(message: S, category: C) -> Self {
        Self {
            level: MessageLevel::Info,
            category: category.into(),
            message: message.into(),
        }
    }

    pub fn warning<S: Into<String>, C: Into<String>>(message: S, category: C) -> Self {
        Self {
            level: MessageLevel::Warning,
            category: category.into(),
            message: message.into(),
        }
    }

    pub fn error<S: Into<String>, C: Into<String>>(message: S, category: C) -> Self {
        Self {
            level: MessageLevel::Error,
            category: category.into(),
            message: message.into(),
        }
    }
}

impl Display for ReportMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.category, self.message)
    }
}

/// JSON cannot carry infinities, so non-finite levels are written as strings.
fn serialize_db<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.is_finite() => serializer.serialize_f64(*v),
        Some(v) if *v < 0.0 => serializer.serialize_str("-inf"),
        Some(_) => serializer.serialize_str("inf"),
        None => serializer.serialize_none(),
    }
}

/// Per-interval entry of the report.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    /// 1-based position in the run's interval list
    pub segment_id: usize,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(serialize_with = "serialize_db")]
    pub actual_rms_db: Option<f64>,
    /// `None` when verification was disabled
    pub meets_threshold: Option<bool>,
    pub strategy_used: StrategyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full record of one censoring run.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub timestamp: String,
    pub input_video: PathBuf,
    pub output_video: Option<PathBuf>,
    pub threshold_db: f64,
    pub overall_success: bool,
    /// False when the run skipped loudness verification
    pub verified: bool,
    pub subtitle_source: Option<String>,
    pub final_strategy_used: Option<StrategyLevel>,
    pub attempted_levels: Vec<StrategyLevel>,
    pub segments: Vec<SegmentReport>,
    pub messages: Vec<ReportMessage>,
    pub error_messages: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DiagnosticReport {
    pub fn new(input: &Path, threshold_db: f64) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            input_video: input.to_path_buf(),
            output_video: None,
            threshold_db,
            overall_success: false,
            verified: false,
            subtitle_source: None,
            final_strategy_used: None,
            attempted_levels: Vec::new(),
            segments: Vec::new(),
            messages: Vec::new(),
            error_messages: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// Adds a message and logs it at the matching level.
    pub fn add_message(&mut self, message: ReportMessage) {
        match message.level {
            MessageLevel::Info => info!("{message}"),
            MessageLevel::Warning => warn!("{message}"),
            MessageLevel::Error => {
                error!("{message}");
                self.error_messages.push(message.message.clone());
            }
        }
        self.messages.push(message);
    }

    pub fn record_attempt(&mut self, level: StrategyLevel) {
        self.attempted_levels.push(level);
        self.final_strategy_used = Some(level);
    }

    /// Replaces the segment entries with the latest verification pass.
    pub fn record_results(&mut self, results: &[VerificationResult]) {
        self.verified = true;
        self.segments = results
            .iter()
            .enumerate()
            .map(|(i, r)| SegmentReport {
                segment_id: i + 1,
                start_time: r.start,
                end_time: r.end,
                actual_rms_db: r.measured_db,
                meets_threshold: Some(r.passed),
                strategy_used: r.strategy_level,
                error: r.error.clone(),
            })
            .collect();
    }

    /// Records intervals that were filtered but not measured.
    pub fn record_unverified(&mut self, intervals: &[MuteInterval], level: StrategyLevel) {
        self.verified = false;
        self.segments = intervals
            .iter()
            .enumerate()
            .map(|(i, interval)| SegmentReport {
                segment_id: i + 1,
                start_time: interval.start,
                end_time: interval.end,
                actual_rms_db: None,
                meets_threshold: None,
                strategy_used: level,
                error: None,
            })
            .collect();
    }

    /// Segments whose measurement did not meet the threshold.
    pub fn failing_segments(&self) -> impl Iterator<Item = &SegmentReport> {
        self.segments
            .iter()
            .filter(|s| s.meets_threshold == Some(false))
    }

    /// Closes the report: sets the outcome and derives recommendations.
    pub fn finalize(&mut self, success: bool, output: Option<&Path>) {
        self.overall_success = success;
        self.output_video = output.map(Path::to_path_buf);
        self.recommendations = self.build_recommendations();
    }

    fn build_recommendations(&self) -> Vec<String> {
        let mut recommendations = Vec::new();
        let failing: Vec<&SegmentReport> = self.failing_segments().collect();

        if !failing.is_empty() {
            let spans = failing
                .iter()
                .map(|s| format!("{:.3}-{:.3}s", s.start_time, s.end_time))
                .collect::<Vec<_>>()
                .join(", ");
            recommendations.push(format!("Manually review the audio at {spans}"));

            let loudest = failing
                .iter()
                .filter_map(|s| s.actual_rms_db)
                .filter(|db| db.is_finite())
                .fold(f64::NEG_INFINITY, f64::max);
            if loudest.is_finite() {
                recommendations.push(format!(
                    "The loudest failing segment measured {loudest:.1} dB; a threshold of {:.0} dB would accept it if that level is inaudible for your use",
                    loudest.ceil()
                ));
            }

            if self.final_strategy_used == Some(StrategyLevel::MAX) {
                recommendations.push(
                    "Even the aggressive strategy left audible audio; check the source for extra audio streams or unusual channel layouts".to_string(),
                );
            }
        }

        if self.segments.iter().any(|s| s.error.is_some()) {
            recommendations.push(
                "Some segments could not be measured; check that ffmpeg supports the astats filter".to_string(),
            );
        }

        if !self.verified && !self.segments.is_empty() {
            recommendations.push("Run with verification enabled to confirm the muted segments are silent".to_string());
        }

        recommendations
    }

    /// Logs the `DIAGNOSTIC REPORT` section.
    pub fn log_summary(&self) {
        log_section("DIAGNOSTIC REPORT");
        info!("Input: {}", self.input_video.display());
        if let Some(output) = &self.output_video {
            info!("Output: {}", output.display());
        }
        let levels = self
            .attempted_levels
            .iter()
            .map(|l| l.as_u8().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            "Strategy levels attempted: [{levels}], final: {}",
            self.final_strategy_used
                .map_or("none".to_string(), |l| l.to_string())
        );
        for segment in &self.segments {
            let verdict = match segment.meets_threshold {
                Some(true) => "PASS",
                Some(false) => "FAIL",
                None => "UNVERIFIED",
            };
            info!(
                "Segment {} [{:.3}-{:.3}] RMS level {}: {verdict}",
                segment.segment_id,
                segment.start_time,
                segment.end_time,
                format_db(segment.actual_rms_db)
            );
        }
        for recommendation in &self.recommendations {
            info!("Recommendation: {recommendation}");
        }
        info!(
            "Overall: {}",
            if self.overall_success { "SUCCESS" } else { "DEGRADED" }
        );
    }

    /// Writes the report as pretty JSON into `dir` and returns its path.
    ///
    /// The name is `<stem>_<ext>_diagnostic_<timestamp>_<random>.json` so
    /// inputs sharing a stem never overwrite each other's reports.
    pub fn write_report(&self, dir: &Path) -> CoreResult<PathBuf> {
        let mut prefix = get_stem_safe(&self.input_video)?;
        if let Some(ext) = self.input_video.extension() {
            prefix.push('_');
            prefix.push_str(&ext.to_string_lossy());
        }
        let prefix = format!("{prefix}_diagnostic_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let path = create_temp_file_path(dir, &prefix, "json");

        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::JsonParseError(format!("cannot serialize report: {e}")))?;
        std::fs::write(&path, json)?;

        info!("Diagnostic report written to {}", path.display());
        Ok(path)
    }
}
