//! Implementation of the `censor` command.
//!
//! Builds the core configuration from the arguments, checks that ffmpeg and
//! ffprobe run, then censors a single file or every video in a directory.
//! Degraded runs are reported as warnings; any failed file makes the
//! command fail after the summary is printed.

// ---- Internal crate imports ----
use crate::cli::CensorArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;

// ---- External crate imports ----
use guardian_core::{
    CensorOutcome, CensorProcessor, Completion, CoreConfig, CoreConfigBuilder, CoreError, FfmpegToolkit,
    check_dependency, find_processable_files, format_duration, load_word_list,
};
use log::info;

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What happened to each input of a `censor` run.
#[derive(Debug, Default)]
pub struct CensorSummary {
    /// Output paths of successful runs
    pub completed: Vec<PathBuf>,
    /// Output and report paths of degraded runs
    pub degraded: Vec<(PathBuf, Option<PathBuf>)>,
    /// Inputs that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl CensorSummary {
    pub fn record(&mut self, outcome: &CensorOutcome) {
        if outcome.completion == Completion::Degraded {
            self.degraded
                .push((outcome.output_path.clone(), outcome.report_path.clone()));
        } else {
            self.completed.push(outcome.output_path.clone());
        }
    }

    pub fn total(&self) -> usize {
        self.completed.len() + self.degraded.len() + self.failed.len()
    }
}

/// Translates command-line arguments into a validated [`CoreConfig`].
pub fn build_config(args: &CensorArgs) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .ffmpeg_path(args.ffmpeg_path.clone())
        .ffprobe_path(args.ffprobe_path.clone())
        .silence_threshold_db(args.threshold)
        .verify(!args.no_verify);

    if let Some(path) = &args.words_file {
        let words = load_word_list(path)?;
        if words.is_empty() {
            terminal::print_warning(&format!("{} contains no words; nothing will be muted", path.display()));
        }
        builder = builder.word_list(words);
    }
    if let Some(dir) = &args.diagnostics_dir {
        builder = builder.diagnostics_dir(dir.clone());
    }
    if let Some(secs) = args.timeout {
        builder = builder.encode_timeout(Duration::from_secs(secs));
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// Main entry point for the `censor` command.
pub fn run_censor(args: CensorArgs) -> CliResult<CensorSummary> {
    let started = Instant::now();

    if !args.input.exists() {
        return Err(CoreError::MediaUnreadable(format!(
            "Input path {} does not exist",
            args.input.display()
        )));
    }

    let config = build_config(&args)?;
    check_dependency(&config.ffmpeg_path)?;
    check_dependency(&config.ffprobe_path)?;
    info!("External dependency check passed.");

    let toolkit = FfmpegToolkit::from_config(&config);
    let processor = CensorProcessor::new(toolkit, config)?;
    let mut summary = CensorSummary::default();

    if args.input.is_dir() {
        if let Some(output) = &args.output {
            if output.is_file() {
                return Err(CoreError::PathError(format!(
                    "Output {} must be a directory when the input is a directory",
                    output.display()
                )));
            }
            std::fs::create_dir_all(output)
                .cli_with_context(|| format!("Cannot create output directory {}", output.display()))?;
        }

        let files = find_processable_files(&args.input, &processor.config().output_suffix)
            .cli_with_context(|| format!("Nothing to censor in {}", args.input.display()))?;
        info!("Found {} file(s) to process.", files.len());

        for (input, result) in processor.process_batch(&files, args.output.as_deref()) {
            match result {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => summary.failed.push((input, e.to_string())),
            }
        }
    } else {
        let outcome = processor.process_video(&args.input, args.output.as_deref())?;
        summary.record(&outcome);
    }

    print_summary(&summary, started.elapsed());

    if !summary.failed.is_empty() {
        return Err(CoreError::OperationFailed(format!(
            "{} of {} file(s) failed",
            summary.failed.len(),
            summary.total()
        )));
    }
    Ok(summary)
}

fn print_summary(summary: &CensorSummary, elapsed: Duration) {
    terminal::print_section("Censoring Summary");
    for output in &summary.completed {
        terminal::print_success(&format!("{}", output.display()));
    }
    for (output, report) in &summary.degraded {
        let report = report
            .as_ref()
            .map_or("the log".to_string(), |p| p.display().to_string());
        terminal::print_warning(&format!(
            "{} still has audible segments after every strategy; see {report}",
            output.display()
        ));
    }
    for (input, error) in &summary.failed {
        terminal::print_warning(&format!("{} failed: {error}", input.display()));
    }
    terminal::print_fields(&[
        ("Completed", summary.completed.len().to_string()),
        ("Degraded", summary.degraded.len().to_string()),
        ("Failed", summary.failed.len().to_string()),
        ("Total time", format_duration(elapsed.as_secs_f64())),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn censor_args(extra: &[&str]) -> CensorArgs {
        let mut argv = vec!["guardian", "censor", "movie.mkv"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Censor(args) => args,
            Commands::Info(_) => panic!("expected censor"),
        }
    }

    #[test]
    fn test_build_config_from_args() {
        let config = build_config(&censor_args(&["--threshold", "-42.5", "--no-verify", "--timeout", "90"])).unwrap();
        assert_eq!(config.silence_threshold_db, -42.5);
        assert!(!config.verify);
        assert_eq!(config.encode_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_build_config_reads_word_file() {
        let dir = tempfile::tempdir().unwrap();
        let words = dir.path().join("words.txt");
        std::fs::write(&words, "# custom\nheck\n\ndarn it\n").unwrap();

        let config = build_config(&censor_args(&["--words-file", words.to_str().unwrap()])).unwrap();
        assert_eq!(config.word_list, vec!["heck".to_string(), "darn it".to_string()]);
    }

    #[test]
    fn test_missing_word_file_fails() {
        assert!(build_config(&censor_args(&["--words-file", "/nonexistent/words.txt"])).is_err());
    }
}
