//! Implementation of the `info` command: shows what guardian sees in a video.

use crate::cli::InfoArgs;
use crate::error::CliResult;
use crate::terminal;

use guardian_core::{
    CoreConfigBuilder, CoreError, FfmpegToolkit, VideoMetadata, check_dependency, extract_metadata,
    format_duration,
};

/// Main entry point for the `info` command.
pub fn run_info(args: InfoArgs) -> CliResult<()> {
    if !args.input.is_file() {
        return Err(CoreError::MediaUnreadable(format!(
            "{} does not exist or is not a file",
            args.input.display()
        )));
    }

    let config = CoreConfigBuilder::new()
        .ffprobe_path(args.ffprobe_path.clone())
        .build();
    check_dependency(&config.ffprobe_path)?;

    let toolkit = FfmpegToolkit::from_config(&config);
    let metadata = extract_metadata(&toolkit, &args.input)?;

    if args.json {
        let json = serde_json::to_string_pretty(&metadata)
            .map_err(|e| CoreError::JsonParseError(format!("Cannot serialize metadata: {e}")))?;
        println!("{json}");
    } else {
        terminal::print_section(&format!("Media info: {}", args.input.display()));
        terminal::print_fields(&metadata_fields(&metadata));
    }
    Ok(())
}

/// Human-readable key/value rows for `metadata`.
pub fn metadata_fields(metadata: &VideoMetadata) -> Vec<(&'static str, String)> {
    let unknown = || "unknown".to_string();
    let resolution = match (metadata.width, metadata.height) {
        (Some(w), Some(h)) => format!("{w}x{h}"),
        _ => unknown(),
    };
    let audio = metadata.audio.as_ref().map_or("none".to_string(), |a| {
        let rate = a.sample_rate.map_or(unknown(), |r| format!("{r} Hz"));
        let layout = if a.channel_layout.is_empty() {
            String::new()
        } else {
            format!(" ({})", a.channel_layout)
        };
        format!("{}, {rate}, {} channels{layout}", a.codec, a.channels)
    });

    vec![
        ("Duration", format_duration(metadata.duration_secs)),
        ("Resolution", resolution),
        ("Frame rate", metadata.frame_timing.fps().map_or_else(unknown, |fps| format!("{fps} fps"))),
        ("Frame duration", metadata.frame_timing.frame_duration().unwrap_or_else(unknown)),
        ("Audio", audio),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::media::{AudioStreamInfo, FrameTiming};

    #[test]
    fn test_metadata_fields() {
        let metadata = VideoMetadata {
            duration_secs: 5.0,
            width: Some(1920),
            height: Some(1080),
            frame_timing: FrameTiming::Known {
                numerator: 30000,
                denominator: 1001,
            },
            audio: Some(AudioStreamInfo {
                index: 0,
                codec: "aac".to_string(),
                sample_rate: Some(48000),
                channels: 2,
                channel_layout: "stereo".to_string(),
            }),
        };
        let fields = metadata_fields(&metadata);
        assert_eq!(fields[0], ("Duration", "00:00:05.000".to_string()));
        assert_eq!(fields[1].1, "1920x1080");
        assert_eq!(fields[2].1, "29.970 fps");
        assert_eq!(fields[3].1, "1001/30000");
        assert_eq!(fields[4].1, "aac, 48000 Hz, 2 channels (stereo)");
    }

    #[test]
    fn test_unknown_fields() {
        let metadata = VideoMetadata {
            duration_secs: 1.5,
            width: None,
            height: None,
            frame_timing: FrameTiming::Unknown,
            audio: None,
        };
        let fields = metadata_fields(&metadata);
        assert_eq!(fields[1].1, "unknown");
        assert_eq!(fields[2].1, "unknown");
        assert_eq!(fields[4].1, "none");
    }
}
