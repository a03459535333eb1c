// ============================================================================
// guardian-core/src/processing/censor.rs
// ============================================================================
//
// CENSORING ORCHESTRATION: One Input Video From Probe to Verified Output
//
// This module drives a single censoring run and owns the escalation loop.
// The pipeline is:
//
//   Init -> MetadataExtracted -> SubtitlesResolved -> IntervalsComputed
//        -> Filtering(level) -> Verifying(level) -> Done | Failed
//
// with Copying replacing the filter/verify loop when nothing needs muting.
// The legal moves are encoded in the pure `transition` function so the
// escalation policy can be tested without running anything.
//
// KEY COMPONENTS:
// - RunState / StepEvent / Completion: the state machine
// - transition: the escalation policy
// - CensorProcessor: executes the states against a MediaToolkit
// - CensorOutcome: output path, completion kind and diagnostic report
//
// AI-ASSISTANT-INFO: Censoring pipeline orchestration and strategy escalation

// ---- Internal crate imports ----
use crate::config::{CoreConfig, DEFAULT_SAMPLE_RATE};
use crate::error::{CoreError, CoreResult};
use crate::external::MediaToolkit;
use crate::logging::{log_section, log_status, log_subsection};
use crate::media::metadata::{VideoMetadata, extract_metadata};
use crate::processing::filters::{FilterOptions, StrategyLevel, build_filter_graph};
use crate::processing::profanity::{MuteInterval, ProfanityPattern, find_mute_intervals};
use crate::reporting::{DiagnosticReport, ReportMessage};
use crate::subtitles::locate_subtitles;
use crate::temp_files::{create_probe_file, create_temp_dir};
use crate::utils::{default_output_path, format_duration, get_filename_safe, same_file};
use crate::validation::SilenceVerifier;

// ---- External crate imports ----
use log::{debug, info, warn};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::time::Instant;

// ============================================================================
// STATE MACHINE
// ============================================================================

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Nothing to mute; streams were copied unchanged
    PassThrough,
    /// Every interval measured at or below the threshold
    Verified,
    /// Encoded once without measuring
    Unverified,
    /// The strongest strategy still left audible intervals; output kept
    Degraded,
}

impl Completion {
    pub fn is_success(self) -> bool {
        !matches!(self, Completion::Degraded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    MetadataExtracted,
    SubtitlesResolved,
    IntervalsComputed { count: usize },
    Copying,
    Filtering(StrategyLevel),
    Verifying(StrategyLevel),
    Done(Completion),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    MetadataReady,
    SubtitlesReady,
    IntervalsReady { count: usize },
    Start,
    CopyFinished,
    EncodeSucceeded,
    EncodeFailed,
    VerificationPassed,
    VerificationFailed,
}

/// Escalation policy.
///
/// Encode failures and failed verification both move to the next level until
/// `max_level`; past it an encode failure fails the run while a failed
/// verification ends it degraded. With `verify` off a successful encode ends
/// the run unverified. Any event that does not fit the state fails the run.
pub fn transition(state: RunState, event: StepEvent, max_level: StrategyLevel, verify: bool) -> RunState {
    let escalate = |level: StrategyLevel| level.next().filter(|next| *next <= max_level);

    match (state, event) {
        (RunState::Init, StepEvent::MetadataReady) => RunState::MetadataExtracted,
        (RunState::MetadataExtracted, StepEvent::SubtitlesReady) => RunState::SubtitlesResolved,
        (RunState::SubtitlesResolved, StepEvent::IntervalsReady { count }) => {
            RunState::IntervalsComputed { count }
        }
        (RunState::IntervalsComputed { count: 0 }, StepEvent::Start) => RunState::Copying,
        (RunState::IntervalsComputed { .. }, StepEvent::Start) => RunState::Filtering(StrategyLevel::Basic),
        (RunState::Copying, StepEvent::CopyFinished) => RunState::Done(Completion::PassThrough),
        (RunState::Filtering(level), StepEvent::EncodeSucceeded) => {
            if verify {
                RunState::Verifying(level)
            } else {
                RunState::Done(Completion::Unverified)
            }
        }
        (RunState::Filtering(level), StepEvent::EncodeFailed) => {
            escalate(level).map_or(RunState::Failed, RunState::Filtering)
        }
        (RunState::Verifying(_), StepEvent::VerificationPassed) => RunState::Done(Completion::Verified),
        (RunState::Verifying(level), StepEvent::VerificationFailed) => escalate(level)
            .map_or(RunState::Done(Completion::Degraded), RunState::Filtering),
        (state, event) => {
            warn!("Unexpected event {event:?} in state {state:?}");
            RunState::Failed
        }
    }
}

// ============================================================================
// PROCESSOR
// ============================================================================

/// Result of a run that produced an output file.
#[derive(Debug, Clone)]
pub struct CensorOutcome {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub completion: Completion,
    pub report: DiagnosticReport,
    /// `None` when the report could not be written
    pub report_path: Option<PathBuf>,
}

/// Runs censoring for one or more videos with a fixed configuration.
pub struct CensorProcessor<T: MediaToolkit> {
    toolkit: T,
    config: CoreConfig,
    matcher: ProfanityPattern,
    verifier: SilenceVerifier,
}

impl<T: MediaToolkit> CensorProcessor<T> {
    /// Validates `config` and compiles its word list.
    pub fn new(toolkit: T, config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let matcher = ProfanityPattern::new(&config.word_list)?;
        let verifier = SilenceVerifier::new(config.silence_threshold_db);
        Ok(Self {
            toolkit,
            config,
            matcher,
            verifier,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn max_level(&self) -> StrategyLevel {
        if self.config.verify {
            StrategyLevel::MAX
        } else {
            StrategyLevel::Basic
        }
    }

    /// Resolves and checks the output path before any work is done.
    ///
    /// A directory target receives the default file name. The target must
    /// not be the input and its directory must exist and accept new files.
    pub fn prepare_output(&self, input: &Path, output: Option<&Path>) -> CoreResult<PathBuf> {
        let default_name = || -> CoreResult<PathBuf> {
            default_output_path(input, &self.config.output_suffix, &self.config.output_extension)
        };

        let output = match output {
            Some(path) if path.is_dir() => path.join(get_filename_safe(&default_name()?)?),
            Some(path) => path.to_path_buf(),
            None => default_name()?,
        };

        if same_file(input, &output) {
            return Err(CoreError::CensoringFailed(format!(
                "output {} would overwrite the input",
                output.display()
            )));
        }

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            return Err(CoreError::CensoringFailed(format!(
                "output directory {} does not exist",
                dir.display()
            )));
        }
        create_probe_file(&dir).map_err(|e| {
            CoreError::CensoringFailed(format!("output directory {} is not writable: {e}", dir.display()))
        })?;

        Ok(output)
    }

    /// Censors `input`, writing to `output` or the derived default path.
    ///
    /// Returns `Ok` for pass-through, verified, unverified and degraded runs;
    /// degraded runs have `report.overall_success == false`.
    ///
    /// # Errors
    ///
    /// * `CoreError::MediaUnreadable` - the input is missing or cannot be probed
    /// * `CoreError::NoSubtitlesFound` - no subtitle source could be used
    /// * `CoreError::CensoringFailed` - bad output target, or the encode failed
    ///   at the highest strategy level
    pub fn process_video(&self, input: &Path, output: Option<&Path>) -> CoreResult<CensorOutcome> {
        let started = Instant::now();
        log_section("CENSORING OPERATION STARTED");
        info!("Input: {}", input.display());

        if !input.is_file() {
            return Err(CoreError::MediaUnreadable(format!(
                "{} does not exist or is not a file",
                input.display()
            )));
        }
        let output = self.prepare_output(input, output)?;
        info!("Output: {}", output.display());

        let temp_dir = create_temp_dir(&self.config, "guardian_")?;
        let mut report = DiagnosticReport::new(input, self.config.silence_threshold_db);
        let max_level = self.max_level();
        let verify = self.config.verify;

        let metadata = extract_metadata(&self.toolkit, input)?;
        let mut state = transition(RunState::Init, StepEvent::MetadataReady, max_level, verify);

        let subtitles = locate_subtitles(
            &self.toolkit,
            input,
            temp_dir.path(),
            &self.config.subtitle_languages,
        )?;
        report.subtitle_source = Some(subtitles.source.to_string());
        state = transition(state, StepEvent::SubtitlesReady, max_level, verify);

        let mut intervals = find_mute_intervals(&subtitles.segments, &self.matcher);
        if !intervals.is_empty() && metadata.audio.is_none() {
            report.add_message(ReportMessage::warning(
                format!("{} intervals matched but the input has no audio stream", intervals.len()),
                "metadata",
            ));
            intervals.clear();
        }
        for interval in &intervals {
            debug!(
                "Mute {} - {}",
                format_duration(interval.start),
                format_duration(interval.end)
            );
        }
        state = transition(
            state,
            StepEvent::IntervalsReady {
                count: intervals.len(),
            },
            max_level,
            verify,
        );
        state = transition(state, StepEvent::Start, max_level, verify);

        let completion = self.run_until_done(state, input, &output, &metadata, &intervals, &mut report)?;

        report.finalize(completion.is_success(), Some(&output));
        report.log_summary();
        let report_path = self.write_report(&report, &output);

        match completion {
            Completion::Degraded => log_status(
                "degraded",
                "Output kept, but some segments are still audible; see the diagnostic report",
            ),
            Completion::PassThrough => log_status("success", "No profanity found; streams copied unchanged"),
            Completion::Unverified => log_status("success", "Censored output written without verification"),
            Completion::Verified => log_status("success", "All muted segments verified silent"),
        }
        log_section("CENSORING OPERATION COMPLETED");
        info!(
            "Finished {} in {:.1}s",
            input.display(),
            started.elapsed().as_secs_f64()
        );

        Ok(CensorOutcome {
            input_path: input.to_path_buf(),
            output_path: output,
            completion,
            report,
            report_path,
        })
    }

    /// Executes copy / filter / verify states until the run ends.
    fn run_until_done(
        &self,
        mut state: RunState,
        input: &Path,
        output: &Path,
        metadata: &VideoMetadata,
        intervals: &[MuteInterval],
        report: &mut DiagnosticReport,
    ) -> CoreResult<Completion> {
        let max_level = self.max_level();
        let verify = self.config.verify;
        let options = FilterOptions {
            quote_char: self.config.quote_char,
            sample_rate: metadata.sample_rate().unwrap_or(DEFAULT_SAMPLE_RATE),
            audio_stream: metadata.audio_stream_index(),
        };
        let mut last_error = String::new();

        loop {
            debug!("Run state: {state:?}");
            let event = match state {
                RunState::Copying => {
                    info!("FFmpeg stream copy: nothing to mute");
                    self.toolkit.copy_streams(input, output).map_err(|e| {
                        self.remove_partial_output(output);
                        CoreError::CensoringFailed(format!("stream copy failed: {e}"))
                    })?;
                    StepEvent::CopyFinished
                }
                RunState::Filtering(level) => {
                    log_section("FILTER CONSTRUCTION");
                    log_subsection(&format!("Strategy {level}"));
                    info!("Muting {} segments", intervals.len());
                    report.record_attempt(level);

                    let graph = build_filter_graph(intervals, level, &options)?;
                    match self.toolkit.filter_encode(input, &graph, output) {
                        Ok(()) => {
                            if !verify {
                                report.record_unverified(intervals, level);
                            }
                            StepEvent::EncodeSucceeded
                        }
                        Err(e) => {
                            last_error = format!("{level} encode failed: {e}");
                            report.add_message(ReportMessage::error(last_error.clone(), "encode"));
                            StepEvent::EncodeFailed
                        }
                    }
                }
                RunState::Verifying(level) => {
                    let results = self.verifier.verify_all(&self.toolkit, output, intervals, level);
                    report.record_results(&results);
                    let failed = results.iter().filter(|r| !r.passed).count();
                    if failed == 0 {
                        StepEvent::VerificationPassed
                    } else {
                        report.add_message(ReportMessage::warning(
                            format!("{failed} of {} segments above threshold after {level}", results.len()),
                            "verification",
                        ));
                        StepEvent::VerificationFailed
                    }
                }
                RunState::Done(completion) => return Ok(completion),
                RunState::Failed => {
                    self.remove_partial_output(output);
                    report.finalize(false, None);
                    report.log_summary();
                    self.write_report(report, output);
                    return Err(CoreError::CensoringFailed(if last_error.is_empty() {
                        "run ended in an unexpected state".to_string()
                    } else {
                        last_error
                    }));
                }
                other => {
                    warn!("Run cannot continue from {other:?}");
                    state = RunState::Failed;
                    continue;
                }
            };

            let next = transition(state, event, max_level, verify);
            if let (RunState::Filtering(from) | RunState::Verifying(from), RunState::Filtering(to)) = (state, next) {
                report.add_message(ReportMessage::info(format!("Escalating from {from} to {to}"), "strategy"));
            }
            state = next;
        }
    }

    fn remove_partial_output(&self, output: &Path) {
        if output.exists() {
            match std::fs::remove_file(output) {
                Ok(()) => info!("Removed partial output {}", output.display()),
                Err(e) => warn!("Could not remove partial output {}: {e}", output.display()),
            }
        }
    }

    /// Best-effort report write; failures are logged, never raised.
    fn write_report(&self, report: &DiagnosticReport, output: &Path) -> Option<PathBuf> {
        let dir = match &self.config.diagnostics_dir {
            Some(dir) => dir.clone(),
            None => match output.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };
        match report.write_report(&dir) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Could not write diagnostic report to {}: {e}", dir.display());
                None
            }
        }
    }

    /// Processes each input to completion in order. Outputs go to
    /// `output_dir` when given, otherwise next to each input.
    pub fn process_batch(
        &self,
        inputs: &[PathBuf],
        output_dir: Option<&Path>,
    ) -> Vec<(PathBuf, CoreResult<CensorOutcome>)> {
        let total = inputs.len();
        inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                info!("Processing file {} of {total}: {}", i + 1, input.display());
                let result = self.process_video(input, output_dir);
                if let Err(e) = &result {
                    log_status("failed", &format!("{}: {e}", input.display()));
                }
                (input.clone(), result)
            })
            .collect()
    }
}
