// ============================================================================
// guardian-cli/src/cli.rs
// ============================================================================
//
// CLI DEFINITION: Command-Line Arguments
//
// Defines the argument structures parsed by clap. Tool paths can also come
// from the environment (GUARDIAN_FFMPEG_PATH / GUARDIAN_FFPROBE_PATH).
//
// AI-ASSISTANT-INFO: clap argument definitions for the guardian binary

use clap::{Args, Parser, Subcommand};
use guardian_core::config::DEFAULT_SILENCE_THRESHOLD_DB;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Guardian: subtitle-driven audio censoring",
    long_about = "Mutes the audio under subtitle lines that contain listed words, \
                  verifies the muted ranges are silent and writes a diagnostic report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Also write the log to this file
    #[arg(long, global = true, value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Censors a video file, or every video in a directory
    Censor(CensorArgs),
    /// Prints the metadata guardian extracts from a video
    Info(InfoArgs),
}

#[derive(Args, Debug)]
pub struct CensorArgs {
    /// Input video file or directory of videos
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file, or output directory for directory inputs
    /// (defaults to <input>_censored.mp4 next to each input)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "PATH", env = "GUARDIAN_FFMPEG_PATH", default_value = "ffmpeg")]
    pub ffmpeg_path: PathBuf,

    #[arg(long, value_name = "PATH", env = "GUARDIAN_FFPROBE_PATH", default_value = "ffprobe")]
    pub ffprobe_path: PathBuf,

    /// RMS level (dB) a muted range must reach to count as silent
    #[arg(long, value_name = "DB", default_value_t = DEFAULT_SILENCE_THRESHOLD_DB, allow_negative_numbers = true)]
    pub threshold: f64,

    /// Word list file, one entry per line (# starts a comment)
    #[arg(long, value_name = "FILE")]
    pub words_file: Option<PathBuf>,

    /// Encode once with the basic strategy and skip loudness verification
    #[arg(long, default_value_t = false)]
    pub no_verify: bool,

    /// Directory for diagnostic reports (defaults to the output directory)
    #[arg(long, value_name = "DIR")]
    pub diagnostics_dir: Option<PathBuf>,

    /// Kill an ffmpeg encode that runs longer than this many seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Video file to inspect
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print the metadata as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, value_name = "PATH", env = "GUARDIAN_FFPROBE_PATH", default_value = "ffprobe")]
    pub ffprobe_path: PathBuf,
}
