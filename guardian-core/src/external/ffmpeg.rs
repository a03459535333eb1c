// ============================================================================
// guardian-core/src/external/ffmpeg.rs
// ============================================================================
//
// FFMPEG TOOLKIT: Production MediaToolkit backed by ffmpeg and ffprobe
//
// ffmpeg invocations are assembled with ffmpeg_sidecar's FfmpegCommand
// builder and run through util::command so every call honours a timeout.
// ffprobe has no builder in the sidecar crate and is driven through a plain
// std::process::Command.
//
// AI-ASSISTANT-INFO: ffmpeg/ffprobe command construction for the censoring pipeline

// ---- Internal crate imports ----
use super::{MediaToolkit, ToolOutput};
use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::processing::filters::FilterGraph;
use crate::util::command::{run_command, run_command_checked};

// ---- External crate imports ----
use ffmpeg_sidecar::command::FfmpegCommand;
use log::{debug, info};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// [`MediaToolkit`] that runs the real ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    audio_codec: String,
    audio_bitrate: String,
    encode_timeout: Duration,
    probe_timeout: Duration,
}

impl FfmpegToolkit {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            audio_codec: config.audio_codec.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
            encode_timeout: config.encode_timeout,
            probe_timeout: config.probe_timeout,
        }
    }

    fn ffmpeg(&self) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        cmd.hide_banner();
        cmd
    }

    fn ffprobe(&self, input: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.args(["-v", "error"]).args(args).arg(input);
        cmd
    }

    fn probe(&self, input: &Path, args: &[&str], name: &str) -> CoreResult<String> {
        let mut cmd = self.ffprobe(input, args);
        let output = run_command_checked(&mut cmd, name, Some(self.probe_timeout))?;
        Ok(output.stdout)
    }

    /// Argument list for a censoring encode, excluding input and output.
    pub fn encode_args(&self, graph: &FilterGraph) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        match graph {
            FilterGraph::Simple { chain, .. } => args.extend(["-af".to_string(), chain.clone()]),
            FilterGraph::Complex { graph, .. } => args.extend(["-filter_complex".to_string(), graph.clone()]),
        }
        args.extend(["-map", "0:v?", "-map"].map(String::from));
        args.push(graph.audio_map());
        args.extend(["-c:v", "copy", "-c:a"].map(String::from));
        args.push(self.audio_codec.clone());
        args.push("-b:a".to_string());
        args.push(self.audio_bitrate.clone());
        args.extend(["-map_metadata", "-1", "-movflags", "+faststart"].map(String::from));
        args
    }

    /// Argument list for a pass-through copy. Only video and audio are
    /// mapped so attachments and data streams the output container cannot
    /// hold do not fail the copy.
    pub fn copy_args() -> Vec<String> {
        ["-map", "0:v?", "-map", "0:a?", "-c", "copy"].map(String::from).to_vec()
    }
}

impl MediaToolkit for FfmpegToolkit {
    fn probe_duration(&self, input: &Path) -> CoreResult<String> {
        self.probe(
            input,
            &[
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ],
            "ffprobe (duration)",
        )
    }

    fn probe_audio_streams(&self, input: &Path) -> CoreResult<String> {
        self.probe(
            input,
            &[
                "-select_streams",
                "a",
                "-show_entries",
                "stream=codec_name,sample_rate,channels,channel_layout",
                "-of",
                "compact=p=0:nk=1",
            ],
            "ffprobe (audio streams)",
        )
    }

    fn probe_video_stream(&self, input: &Path) -> CoreResult<String> {
        self.probe(
            input,
            &[
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,r_frame_rate",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ],
            "ffprobe (video stream)",
        )
    }

    fn list_streams(&self, input: &Path) -> CoreResult<String> {
        self.probe(
            input,
            &[
                "-show_entries",
                "stream=index,codec_name,codec_type:stream_disposition=default",
                "-of",
                "json",
            ],
            "ffprobe (stream list)",
        )
    }

    fn extract_stream(&self, input: &Path, stream_index: u32, output: &Path) -> CoreResult<()> {
        let stream_map = format!("0:{stream_index}");
        let mut cmd = self.ffmpeg();
        cmd.overwrite()
            .input(input.to_string_lossy().as_ref())
            .args(["-map", stream_map.as_str(), "-c:s", "srt"])
            .output(output.to_string_lossy().as_ref());

        debug!("Extracting subtitle stream {stream_index} to {}", output.display());
        run_command_checked(cmd.as_inner_mut(), "ffmpeg (subtitle extract)", Some(self.probe_timeout))?;
        Ok(())
    }

    fn filter_encode(&self, input: &Path, graph: &FilterGraph, output: &Path) -> CoreResult<()> {
        let mut cmd = self.ffmpeg();
        cmd.overwrite()
            .input(input.to_string_lossy().as_ref())
            .args(self.encode_args(graph))
            .output(output.to_string_lossy().as_ref());

        info!("FFmpeg encode: {} -> {}", input.display(), output.display());
        debug!("FFmpeg filter graph: {}", graph.as_str());
        run_command_checked(cmd.as_inner_mut(), "ffmpeg (encode)", Some(self.encode_timeout))?;
        Ok(())
    }

    fn copy_streams(&self, input: &Path, output: &Path) -> CoreResult<()> {
        let mut cmd = self.ffmpeg();
        cmd.overwrite()
            .input(input.to_string_lossy().as_ref())
            .args(Self::copy_args())
            .output(output.to_string_lossy().as_ref());

        info!("FFmpeg stream copy: {} -> {}", input.display(), output.display());
        run_command_checked(cmd.as_inner_mut(), "ffmpeg (copy)", Some(self.encode_timeout))?;
        Ok(())
    }

    fn audio_stats(&self, input: &Path, start: f64, duration: f64) -> CoreResult<ToolOutput> {
        let seek = format!("{start:.3}");
        let length = format!("{duration:.3}");
        let mut cmd = self.ffmpeg();
        cmd.args(["-nostats", "-ss", seek.as_str(), "-t", length.as_str()])
            .input(input.to_string_lossy().as_ref())
            .args([
                "-vn",
                "-af",
                "astats=metadata=1:reset=0,ametadata=print:key=lavfi.astats.Overall.RMS_level",
                "-f",
                "null",
            ])
            .output("-");

        let output = run_command(cmd.as_inner_mut(), "ffmpeg (astats)", Some(self.probe_timeout))?;
        Ok(output.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_encode_args() {
        let toolkit = FfmpegToolkit::from_config(&CoreConfig::default());
        let graph = FilterGraph::Simple {
            chain: "volume=0:enable='between(t,1.0,2.0)'".to_string(),
            audio_stream: 0,
        };
        let args = toolkit.encode_args(&graph);

        let af = args.iter().position(|a| a == "-af").unwrap();
        assert_eq!(args[af + 1], "volume=0:enable='between(t,1.0,2.0)'");
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "copy"));
        assert!(args.windows(2).any(|w| w[0] == "-c:a" && w[1] == "aac"));
        assert!(args.windows(2).any(|w| w[0] == "-b:a" && w[1] == "192k"));
        assert!(args.windows(2).any(|w| w[0] == "-movflags" && w[1] == "+faststart"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:a:0"));
    }

    #[test]
    fn test_simple_encode_maps_selected_audio_stream() {
        let toolkit = FfmpegToolkit::from_config(&CoreConfig::default());
        let graph = FilterGraph::Simple {
            chain: "volume=0:enable='between(t,1.0,2.0)'".to_string(),
            audio_stream: 2,
        };
        let args = toolkit.encode_args(&graph);
        let maps: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-map")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(maps, vec!["0:v?", "0:a:2"]);
    }

    #[test]
    fn test_copy_args_map_only_video_and_audio() {
        let args = FfmpegToolkit::copy_args();
        assert!(!args.windows(2).any(|w| w[0] == "-map" && w[1] == "0"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:v?"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:a?"));
        assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
    }

    #[test]
    fn test_complex_encode_maps_output_label() {
        let toolkit = FfmpegToolkit::from_config(&CoreConfig::default());
        let graph = FilterGraph::Complex {
            graph: "[0:a]anull[aout]".to_string(),
            output_label: "aout".to_string(),
        };
        let args = toolkit.encode_args(&graph);

        assert!(!args.contains(&"-af".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "-filter_complex" && w[1] == "[0:a]anull[aout]"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[aout]"));
    }
}
