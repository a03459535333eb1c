//! Media information module
//!
//! This module turns prober output into the metadata the censoring pipeline
//! needs: duration, the audio stream to filter and the video framerate.

pub mod metadata;

// Re-export commonly used types
pub use metadata::{AudioStreamInfo, FrameTiming, VideoMetadata, extract_metadata};
