//! Core library for subtitle-driven audio censoring using ffmpeg and ffprobe.
//!
//! Given a video, the library finds its dialogue (a sidecar SRT file or an
//! embedded text track), locates subtitle cues containing listed words,
//! mutes those time ranges with an ffmpeg audio filter and measures the
//! output to confirm the ranges are silent. When a range is still audible
//! the run re-encodes with a stronger strategy, up to three levels. Every
//! run leaves a JSON diagnostic report.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use guardian_core::{CensorProcessor, CoreConfigBuilder, FfmpegToolkit};
//! use std::path::Path;
//!
//! let config = CoreConfigBuilder::new()
//!     .silence_threshold_db(-50.0)
//!     .build();
//! let toolkit = FfmpegToolkit::from_config(&config);
//! let processor = CensorProcessor::new(toolkit, config).unwrap();
//!
//! let outcome = processor
//!     .process_video(Path::new("/videos/movie.mkv"), None)
//!     .unwrap();
//! println!("Wrote {}", outcome.output_path.display());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod logging;
pub mod media;
pub mod processing;
pub mod reporting;
pub mod subtitles;
pub mod temp_files;
pub mod util;
pub mod utils;
pub mod validation;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, load_word_list};
pub use discovery::{find_processable_files, is_video_file};
pub use error::{CoreError, CoreResult};
pub use external::{FfmpegToolkit, MediaToolkit, check_dependency};
pub use media::{VideoMetadata, extract_metadata};
pub use processing::{CensorOutcome, CensorProcessor, Completion, StrategyLevel};
pub use reporting::DiagnosticReport;
pub use utils::{format_db, format_duration};
