//! Configuration structures and constants for the guardian-core library.
//!
//! This module provides the immutable run configuration consumed by the
//! censoring pipeline: the profanity word list, tool paths, verification
//! threshold, output naming, audio encode settings and timeouts.

mod builder;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

pub use builder::CoreConfigBuilder;

// Default constants

/// Built-in profanity list used when no word list is supplied.
/// Multi-word entries are matched as whole phrases.
pub const DEFAULT_WORD_LIST: &[&str] = &[
    "fucking", "fuck", "shit", "damn", "hell", "ass", "bitch", "bastard",
    "bullshit", "fucker", "fucked", "asshole", "piss", "jesus christ", "jesus",
    "sex", "pussy", "son of a bitch", "sonofabitch", "jackass", "smartass",
    "tits", "whore", "cunt", "slut", "boobs", "orgasm", "penis", "blowjob",
    "handjob", "hard on", "cocksucker", "dipshit", "horseshit", "jack off",
    "nympho", "rape", "fuckface", "skank", "shitspray", "bitches", "nigga",
    "nigger", "dickhead", "prick", "arsehole", "motherfucker", "goddamn",
    "shithead", "douchebag", "fag", "faggot",
];

/// Loudness (dB RMS) at or below which a muted interval counts as silent.
pub const DEFAULT_SILENCE_THRESHOLD_DB: f64 = -50.0;

/// Quote character wrapped around `enable=` gate expressions.
pub const DEFAULT_QUOTE_CHAR: char = '\'';

/// Suffix appended to the input stem when no output path is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_censored";

/// Container extension used for derived output paths.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";

/// Audio codec and bitrate for the re-encoded track.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";

/// Sample rate for the generated silence source when the input's is unknown.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Seconds allowed for a single encode.
pub const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 3600;

/// Seconds allowed for probes, extraction and loudness measurement.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 300;

/// Sidecar subtitle languages tried before any other `<base>.<lang>.srt`.
pub const DEFAULT_SUBTITLE_LANGUAGES: &[&str] = &["en", "fr", "es", "de", "it"];

/// Main configuration structure for the guardian-core library.
///
/// Built once (usually by guardian-cli through [`CoreConfigBuilder`]) and
/// shared read-only by every run, including every file of a batch.
///
/// # Examples
///
/// ```rust
/// use guardian_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .silence_threshold_db(-55.0)
///     .verify(true)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Words and phrases to mute, matched case-insensitively on word boundaries
    pub word_list: Vec<String>,

    /// ffmpeg executable (name on PATH or absolute path)
    pub ffmpeg_path: PathBuf,

    /// ffprobe executable (name on PATH or absolute path)
    pub ffprobe_path: PathBuf,

    /// Loudness threshold in dB for the silence check
    pub silence_threshold_db: f64,

    /// Whether to measure each muted interval and escalate on failure.
    /// When false a single basic-level attempt is made.
    pub verify: bool,

    /// Quote character used around `enable=` expressions
    pub quote_char: char,

    /// Suffix for derived output names
    pub output_suffix: String,

    /// Extension for derived output names
    pub output_extension: String,

    /// Audio encoder passed to ffmpeg
    pub audio_codec: String,

    /// Audio bitrate passed to ffmpeg
    pub audio_bitrate: String,

    /// Directory for diagnostic reports (defaults to the output's directory)
    pub diagnostics_dir: Option<PathBuf>,

    /// Base directory for per-run temp directories (defaults to the system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// Preferred sidecar languages, in order
    pub subtitle_languages: Vec<String>,

    pub encode_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            word_list: DEFAULT_WORD_LIST.iter().map(|w| w.to_string()).collect(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            silence_threshold_db: DEFAULT_SILENCE_THRESHOLD_DB,
            verify: true,
            quote_char: DEFAULT_QUOTE_CHAR,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            diagnostics_dir: None,
            temp_dir: None,
            subtitle_languages: DEFAULT_SUBTITLE_LANGUAGES
                .iter()
                .map(|l| l.to_string())
                .collect(),
            encode_timeout: Duration::from_secs(DEFAULT_ENCODE_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl CoreConfig {
    /// Checks the configuration for values the pipeline cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.ffmpeg_path.as_os_str().is_empty() {
            return Err(CoreError::Config("ffmpeg path is empty".to_string()));
        }
        if self.ffprobe_path.as_os_str().is_empty() {
            return Err(CoreError::Config("ffprobe path is empty".to_string()));
        }
        if !self.silence_threshold_db.is_finite() {
            return Err(CoreError::Config(format!(
                "silence threshold must be finite, got {}",
                self.silence_threshold_db
            )));
        }
        if self.output_suffix.is_empty() && self.output_extension.is_empty() {
            return Err(CoreError::Config(
                "output suffix and extension cannot both be empty".to_string(),
            ));
        }
        if self.encode_timeout.is_zero() || self.probe_timeout.is_zero() {
            return Err(CoreError::Config("timeouts must be non-zero".to_string()));
        }
        if self.quote_char.is_alphanumeric() || self.quote_char.is_whitespace() {
            return Err(CoreError::Config(format!(
                "'{}' cannot be used as a quote character",
                self.quote_char
            )));
        }
        Ok(())
    }
}

/// Reads a word list file: one entry per line, blank lines and `#` comments ignored.
pub fn load_word_list(path: &Path) -> CoreResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Config(format!("cannot read word list {}: {e}", path.display()))
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.silence_threshold_db, -50.0);
        assert_eq!(config.quote_char, '\'');
        assert!(config.word_list.iter().any(|w| w == "son of a bitch"));
        assert_eq!(config.subtitle_languages, vec!["en", "fr", "es", "de", "it"]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CoreConfig::default();
        config.silence_threshold_db = f64::NAN;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::default();
        config.encode_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = CoreConfig::default();
        config.ffmpeg_path = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = CoreConfig::default();
        config.output_suffix.clear();
        config.output_extension.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_word_list_skips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# house rules").unwrap();
        writeln!(file, "darn").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  heck  ").unwrap();

        let words = load_word_list(file.path()).unwrap();
        assert_eq!(words, vec!["darn", "heck"]);
    }

    #[test]
    fn test_load_word_list_missing_file() {
        let err = load_word_list(Path::new("/nonexistent/words.txt")).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
