// ============================================================================
// guardian-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Every setter is optional; unset values
// fall back to the DEFAULT_* constants in the parent module.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CoreConfig

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::CoreConfig;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use guardian_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path(PathBuf::from("/usr/local/bin/ffmpeg"))
///     .word_list(vec!["darn".to_string(), "heck".to_string()])
///     .quote_char('"')
///     .build();
/// assert_eq!(config.word_list.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the profanity word list.
    ///
    /// # Arguments
    ///
    /// * `words` - Entries to mute; phrases may contain spaces
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn word_list(mut self, words: Vec<String>) -> Self {
        self.config.word_list = words;
        self
    }

    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.ffmpeg_path = path;
        self
    }

    pub fn ffprobe_path(mut self, path: PathBuf) -> Self {
        self.config.ffprobe_path = path;
        self
    }

    /// Sets the loudness threshold (dB) an interval must reach to count as silent.
    pub fn silence_threshold_db(mut self, threshold: f64) -> Self {
        self.config.silence_threshold_db = threshold;
        self
    }

    /// Enables or disables post-encode verification and escalation.
    pub fn verify(mut self, verify: bool) -> Self {
        self.config.verify = verify;
        self
    }

    pub fn quote_char(mut self, quote: char) -> Self {
        self.config.quote_char = quote;
        self
    }

    pub fn output_suffix(mut self, suffix: &str) -> Self {
        self.config.output_suffix = suffix.to_string();
        self
    }

    pub fn output_extension(mut self, extension: &str) -> Self {
        self.config.output_extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn audio_codec(mut self, codec: &str) -> Self {
        self.config.audio_codec = codec.to_string();
        self
    }

    pub fn audio_bitrate(mut self, bitrate: &str) -> Self {
        self.config.audio_bitrate = bitrate.to_string();
        self
    }

    /// Sets the directory diagnostic reports are written to.
    pub fn diagnostics_dir(mut self, dir: PathBuf) -> Self {
        self.config.diagnostics_dir = Some(dir);
        self
    }

    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.config.temp_dir = Some(dir);
        self
    }

    pub fn subtitle_languages(mut self, languages: Vec<String>) -> Self {
        self.config.subtitle_languages = languages;
        self
    }

    pub fn encode_timeout(mut self, timeout: Duration) -> Self {
        self.config.encode_timeout = timeout;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Builds the CoreConfig. Call [`CoreConfig::validate`] before running.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
