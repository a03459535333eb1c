// guardian-core/tests/censor_pipeline_tests.rs

use guardian_core::config::{CoreConfig, CoreConfigBuilder};
use guardian_core::error::CoreError;
use guardian_core::external::mocks::{MockToolkit, ToolCall};
use guardian_core::processing::{CensorProcessor, Completion, StrategyLevel};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const PROFANE_SRT: &str = "1\n00:00:02,000 --> 00:00:03,000\nWhat the <i>fuck</i> is this?\n\n\
                           2\n00:00:04,000 --> 00:00:04,500\nHello there\n";

const CLEAN_SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nGood morning everyone\n";

// Creates `movie.mp4` plus an optional `movie.srt` sidecar.
fn setup(srt: Option<&str>) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("tempdir");
    let video = dir.path().join("movie.mp4");
    fs::write(&video, b"dummy video").expect("write video");
    if let Some(srt) = srt {
        fs::write(dir.path().join("movie.srt"), srt).expect("write srt");
    }
    (dir, video)
}

fn config_for(dir: &Path) -> CoreConfigBuilder {
    CoreConfigBuilder::new().temp_dir(dir.join("tmp"))
}

fn processor(mock: &MockToolkit, config: CoreConfig) -> CensorProcessor<MockToolkit> {
    CensorProcessor::new(mock.clone(), config).expect("valid config")
}

#[test]
fn test_verified_on_first_attempt() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mock = MockToolkit::new().with_rms_by_attempt(vec![-91.0]);
    let outcome = processor(&mock, config_for(dir.path()).build()).process_video(&video, None)?;

    assert_eq!(outcome.completion, Completion::Verified);
    assert_eq!(outcome.output_path, dir.path().join("movie_censored.mp4"));
    assert!(outcome.output_path.exists());
    assert_eq!(mock.encode_count(), 1);
    assert_eq!(
        mock.encoded_filters(),
        vec!["volume=0:enable='between(t,2.0,3.0)'".to_string()]
    );

    let report = &outcome.report;
    assert!(report.overall_success);
    assert!(report.verified);
    assert_eq!(report.attempted_levels, vec![StrategyLevel::Basic]);
    assert_eq!(report.segments.len(), 1);
    assert_eq!(report.segments[0].start_time, 2.0);
    assert_eq!(report.segments[0].end_time, 3.0);
    assert_eq!(report.segments[0].meets_threshold, Some(true));

    let report_path = outcome.report_path.expect("report written");
    assert_eq!(report_path.parent(), Some(dir.path()));
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(report_path)?)?;
    assert_eq!(json["final_strategy_used"], 1);
    Ok(())
}

#[test]
fn test_loud_output_escalates_through_all_levels() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mock = MockToolkit::new().with_rms_by_attempt(vec![-20.0, -20.0, -20.0]);
    let outcome = processor(&mock, config_for(dir.path()).build()).process_video(&video, None)?;

    assert_eq!(outcome.completion, Completion::Degraded);
    assert_eq!(mock.encode_count(), 3);
    assert!(outcome.output_path.exists(), "degraded output is kept");

    let report = &outcome.report;
    assert!(!report.overall_success);
    assert_eq!(
        report.attempted_levels,
        vec![StrategyLevel::Basic, StrategyLevel::Enhanced, StrategyLevel::Aggressive]
    );
    assert_eq!(report.final_strategy_used, Some(StrategyLevel::Aggressive));
    assert_eq!(report.segments[0].meets_threshold, Some(false));
    assert_eq!(report.segments[0].actual_rms_db, Some(-20.0));
    assert!(!report.recommendations.is_empty());

    let filters = mock.encoded_filters();
    assert!(filters[2].contains("[aout]"));
    Ok(())
}

#[test]
fn test_every_level_censors_the_selected_audio_stream() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mut mock = MockToolkit::new().with_rms_by_attempt(vec![-20.0, -20.0, -91.0]);
    mock.audio_output = "aac|48000|2|stereo\nac3|48000|6|5.1(side)\n".to_string();
    let outcome = processor(&mock, config_for(dir.path()).build()).process_video(&video, None)?;

    assert_eq!(outcome.completion, Completion::Verified);
    assert_eq!(
        mock.encoded_audio_maps(),
        vec!["0:a:1".to_string(), "0:a:1".to_string(), "[aout]".to_string()]
    );
    let filters = mock.encoded_filters();
    assert!(filters[2].starts_with("[0:a:1]"));
    Ok(())
}

#[test]
fn test_stops_at_first_passing_level()-> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mock = MockToolkit::new().with_rms_by_attempt(vec![-20.0, -60.0]);
    let outcome = processor(&mock, config_for(dir.path()).build()).process_video(&video, None)?;

    assert_eq!(outcome.completion, Completion::Verified);
    assert_eq!(mock.encode_count(), 2);
    assert_eq!(outcome.report.final_strategy_used, Some(StrategyLevel::Enhanced));
    assert_eq!(outcome.report.segments[0].strategy_used, StrategyLevel::Enhanced);
    Ok(())
}

#[test]
fn test_no_matches_copies_streams() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(CLEAN_SRT));
    let mock = MockToolkit::new();
    let outcome = processor(&mock, config_for(dir.path()).build()).process_video(&video, None)?;

    assert_eq!(outcome.completion, Completion::PassThrough);
    assert_eq!(mock.copy_count(), 1);
    assert_eq!(mock.encode_count(), 0);
    assert!(outcome.report.overall_success);
    assert!(outcome.report.segments.is_empty());
    Ok(())
}

#[test]
fn test_encode_failure_escalates() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mock = MockToolkit::new();
    mock.queue_encode_result(Some("Error initializing filter 'volume'"));
    let outcome = processor(&mock, config_for(dir.path()).build()).process_video(&video, None)?;

    assert_eq!(outcome.completion, Completion::Verified);
    assert_eq!(mock.encode_count(), 2);
    assert_eq!(outcome.report.error_messages.len(), 1);
    assert!(outcome.report.error_messages[0].contains("level 1"));
    Ok(())
}

#[test]
fn test_encode_failure_at_every_level_fails_run() {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mock = MockToolkit::new();
    for _ in 0..3 {
        mock.queue_encode_result(Some("Conversion failed!"));
    }
    let result = processor(&mock, config_for(dir.path()).build()).process_video(&video, None);

    assert!(matches!(result, Err(CoreError::CensoringFailed(_))));
    assert_eq!(mock.encode_count(), 3);
    assert!(!dir.path().join("movie_censored.mp4").exists(), "partial output removed");
}

#[test]
fn test_without_verification_encodes_once() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mock = MockToolkit::new().with_rms_by_attempt(vec![-10.0]);
    let config = config_for(dir.path()).verify(false).build();
    let outcome = processor(&mock, config).process_video(&video, None)?;

    assert_eq!(outcome.completion, Completion::Unverified);
    assert_eq!(mock.encode_count(), 1);
    assert!(!mock.calls().iter().any(|c| matches!(c, ToolCall::Stats { .. })));
    assert!(!outcome.report.verified);
    assert_eq!(outcome.report.segments[0].meets_threshold, None);
    Ok(())
}

#[test]
fn test_embedded_subtitles_are_extracted() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(None);
    let streams = r#"{"streams": [{"index": 2, "codec_name": "subrip", "codec_type": "subtitle"}]}"#;
    let mock = MockToolkit::new().with_embedded_subtitles(streams, PROFANE_SRT);
    let outcome = processor(&mock, config_for(dir.path()).build()).process_video(&video, None)?;

    assert!(
        mock.calls()
            .iter()
            .any(|c| matches!(c, ToolCall::Extract { index: 2, .. }))
    );
    assert_eq!(outcome.completion, Completion::Verified);
    assert!(
        outcome
            .report
            .subtitle_source
            .as_deref()
            .is_some_and(|s| s.contains("embedded stream 2"))
    );
    Ok(())
}

#[test]
fn test_missing_subtitles_aborts() {
    let (dir, video) = setup(None);
    let mock = MockToolkit::new();
    let result = processor(&mock, config_for(dir.path()).build()).process_video(&video, None);

    assert!(matches!(result, Err(CoreError::NoSubtitlesFound(_))));
    assert_eq!(mock.encode_count(), 0);
    assert!(!dir.path().join("movie_censored.mp4").exists());
}

#[test]
fn test_missing_input_is_unreadable() {
    let dir = tempdir().unwrap();
    let mock = MockToolkit::new();
    let result = processor(&mock, config_for(dir.path()).build())
        .process_video(&dir.path().join("absent.mp4"), None);

    assert!(matches!(result, Err(CoreError::MediaUnreadable(_))));
    assert!(mock.calls().is_empty());
}

#[test]
fn test_probe_failure_is_unreadable() {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mut mock = MockToolkit::new();
    mock.probe_error = Some("Invalid data found when processing input".to_string());
    let result = processor(&mock, config_for(dir.path()).build()).process_video(&video, None);

    assert!(matches!(result, Err(CoreError::MediaUnreadable(_))));
}

#[test]
fn test_output_validation() {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mock = MockToolkit::new();
    let processor = processor(&mock, config_for(dir.path()).build());

    let same = processor.process_video(&video, Some(&video));
    assert!(matches!(same, Err(CoreError::CensoringFailed(_))));

    let missing_dir = dir.path().join("no/such/dir/out.mp4");
    let result = processor.process_video(&video, Some(&missing_dir));
    assert!(matches!(result, Err(CoreError::CensoringFailed(_))));
    assert!(mock.calls().is_empty());

    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    let resolved = processor.prepare_output(&video, Some(&out_dir)).unwrap();
    assert_eq!(resolved, out_dir.join("movie_censored.mp4"));
}

#[test]
fn test_missing_audio_stream_passes_through() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let mut mock = MockToolkit::new();
    mock.audio_output = String::new();
    let outcome = processor(&mock, config_for(dir.path()).build()).process_video(&video, None)?;

    assert_eq!(outcome.completion, Completion::PassThrough);
    assert_eq!(mock.encode_count(), 0);
    assert!(
        outcome
            .report
            .messages
            .iter()
            .any(|m| m.message.contains("no audio stream"))
    );
    Ok(())
}

#[test]
fn test_diagnostics_dir_override() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, video) = setup(Some(PROFANE_SRT));
    let reports = dir.path().join("reports");
    let mock = MockToolkit::new();
    let config = config_for(dir.path()).diagnostics_dir(reports.clone()).build();
    let outcome = processor(&mock, config).process_video(&video, None)?;

    let path = outcome.report_path.expect("report written");
    assert_eq!(path.parent(), Some(reports.as_path()));
    Ok(())
}

#[test]
fn test_batch_continues_after_failure() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("a.mp4");
    let bad = dir.path().join("b.mp4");
    fs::write(&good, b"dummy").unwrap();
    fs::write(&bad, b"dummy").unwrap();
    fs::write(dir.path().join("a.srt"), PROFANE_SRT).unwrap();

    let mock = MockToolkit::new();
    let results = processor(&mock, config_for(dir.path()).build()).process_batch(&[bad.clone(), good.clone()], None);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, bad);
    assert!(matches!(results[0].1, Err(CoreError::NoSubtitlesFound(_))));
    assert!(results[1].1.is_ok());
}
