// ============================================================================
// guardian-core/src/subtitles/locator.rs
// ============================================================================
//
// SUBTITLE LOCATOR: Finding the Dialogue Track for a Video
//
// Strategies are tried in a fixed order and the first one that yields at
// least one usable segment wins:
//
// 1. `<base>.srt` next to the video
// 2. `<base>.<lang>.srt`, preferred languages first, then any other language
//    suffix found in the directory (sorted by file name)
// 3. an embedded text subtitle track, converted to SRT in the run's temp dir
//
// A sidecar that exists but parses to nothing falls through to the next
// strategy.
//
// AI-ASSISTANT-INFO: Subtitle source discovery, stream selection and extraction

// ---- Internal crate imports ----
use super::SubtitleSegment;
use super::srt::load_segments;
use crate::error::{CoreError, CoreResult};
use crate::external::MediaToolkit;
use crate::temp_files::create_temp_file_path;

// ---- External crate imports ----
use log::{debug, info, warn};
use serde::Deserialize;

// ---- Standard library imports ----
use std::fmt;
use std::path::{Path, PathBuf};

/// Subtitle codecs ffmpeg can convert to SRT without OCR.
pub const TEXT_SUBTITLE_CODECS: &[&str] = &["subrip", "srt", "mov_text", "ass", "ssa", "webvtt", "text"];

/// Where a run's dialogue came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SubtitleSource {
    /// `<base>.srt`
    Sidecar(PathBuf),
    /// `<base>.<lang>.srt`
    LanguageSidecar { path: PathBuf, language: String },
    /// Embedded stream converted to a temporary SRT file
    Embedded {
        stream_index: u32,
        codec: String,
        path: PathBuf,
    },
}

impl SubtitleSource {
    /// Path of the SRT file the segments were read from.
    pub fn path(&self) -> &Path {
        match self {
            SubtitleSource::Sidecar(path) => path,
            SubtitleSource::LanguageSidecar { path, .. } => path,
            SubtitleSource::Embedded { path, .. } => path,
        }
    }
}

impl fmt::Display for SubtitleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtitleSource::Sidecar(path) => write!(f, "sidecar {}", path.display()),
            SubtitleSource::LanguageSidecar { path, language } => {
                write!(f, "{language} sidecar {}", path.display())
            }
            SubtitleSource::Embedded {
                stream_index,
                codec,
                ..
            } => write!(f, "embedded stream {stream_index} ({codec})"),
        }
    }
}

/// The chosen source together with its parsed segments.
#[derive(Debug, Clone)]
pub struct ResolvedSubtitles {
    pub source: SubtitleSource,
    pub segments: Vec<SubtitleSegment>,
}

// ============================================================================
// STREAM LISTING
// ============================================================================

#[derive(Debug, Deserialize)]
struct StreamListing {
    #[serde(default)]
    streams: Vec<ListedStream>,
}

#[derive(Debug, Deserialize)]
struct ListedStream {
    index: u32,
    #[serde(default)]
    codec_name: Option<String>,
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    disposition: Option<Disposition>,
}

#[derive(Debug, Default, Deserialize)]
struct Disposition {
    #[serde(default)]
    default: u8,
}

/// An embedded subtitle stream that can be converted to SRT.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleStream {
    pub index: u32,
    pub codec: String,
    pub is_default: bool,
}

/// Parses the prober's JSON stream listing into convertible subtitle streams,
/// ordered by preference: default-flagged streams first, then by index.
pub fn parse_subtitle_streams(json: &str) -> CoreResult<Vec<SubtitleStream>> {
    let listing: StreamListing =
        serde_json::from_str(json).map_err(|e| CoreError::JsonParseError(e.to_string()))?;

    let mut streams: Vec<SubtitleStream> = listing
        .streams
        .into_iter()
        .filter(|s| s.codec_type.as_deref().is_none_or(|t| t == "subtitle"))
        .filter_map(|s| {
            let codec = s.codec_name?.to_lowercase();
            if !TEXT_SUBTITLE_CODECS.contains(&codec.as_str()) {
                debug!("Ignoring subtitle stream {} with codec {codec}", s.index);
                return None;
            }
            Some(SubtitleStream {
                index: s.index,
                codec,
                is_default: s.disposition.is_some_and(|d| d.default == 1),
            })
        })
        .collect();

    streams.sort_by_key(|s| (!s.is_default, s.index));
    Ok(streams)
}

// ============================================================================
// SIDECAR DISCOVERY
// ============================================================================

/// Existing sidecar files for `video`, in the order they should be tried.
pub fn sidecar_candidates(video: &Path, languages: &[String]) -> Vec<SubtitleSource> {
    let mut candidates = Vec::new();

    let plain = video.with_extension("srt");
    if plain.is_file() {
        candidates.push(SubtitleSource::Sidecar(plain));
    }

    let Some(stem) = video.file_stem().and_then(|s| s.to_str()) else {
        return candidates;
    };
    let dir = video.parent().unwrap_or_else(|| Path::new("."));
    let dir_for_listing = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };

    // Language tags compare case-insensitively, so `movie.EN.srt` counts as
    // the preferred `en` sidecar.
    let mut found: Vec<(String, PathBuf)> = match std::fs::read_dir(dir_for_listing) {
        Ok(entries) => entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                let name = path.file_name()?.to_str()?;
                let language = language_suffix(name, stem)?;
                path.is_file().then_some((language, path))
            })
            .collect(),
        Err(e) => {
            debug!("Cannot list {}: {e}", dir_for_listing.display());
            Vec::new()
        }
    };
    found.sort_by(|a, b| a.1.cmp(&b.1));

    for language in languages {
        let (matching, rest): (Vec<_>, Vec<_>) = found
            .into_iter()
            .partition(|(suffix, _)| suffix.eq_ignore_ascii_case(language));
        found = rest;
        candidates.extend(matching.into_iter().map(|(_, path)| SubtitleSource::LanguageSidecar {
            path,
            language: language.clone(),
        }));
    }

    candidates.extend(
        found
            .into_iter()
            .map(|(language, path)| SubtitleSource::LanguageSidecar { path, language }),
    );
    candidates
}

/// Returns `lang` when `name` is `<stem>.<lang>.srt`.
fn language_suffix(name: &str, stem: &str) -> Option<String> {
    let rest = name.strip_prefix(stem)?.strip_prefix('.')?;
    let (language, extension) = rest.rsplit_once('.')?;
    if !extension.eq_ignore_ascii_case("srt") || language.is_empty() || language.contains('.') {
        return None;
    }
    Some(language.to_string())
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Finds and parses the dialogue for `video`.
///
/// Embedded tracks are extracted into `temp_dir`, which the caller owns and
/// cleans up.
///
/// # Errors
///
/// * `CoreError::NoSubtitlesFound` - every strategy was exhausted
pub fn locate_subtitles<T: MediaToolkit>(
    toolkit: &T,
    video: &Path,
    temp_dir: &Path,
    languages: &[String],
) -> CoreResult<ResolvedSubtitles> {
    for source in sidecar_candidates(video, languages) {
        match load_segments(source.path()) {
            Ok(segments) if !segments.is_empty() => {
                info!("Using subtitles from {source} ({} segments)", segments.len());
                return Ok(ResolvedSubtitles { source, segments });
            }
            Ok(_) => warn!("{source} contains no usable subtitles, trying next source"),
            Err(e) => warn!("Cannot use {source}: {e}"),
        }
    }

    let streams = match toolkit.list_streams(video).and_then(|json| parse_subtitle_streams(&json)) {
        Ok(streams) => streams,
        Err(e) => {
            warn!("Cannot list streams of {}: {e}", video.display());
            Vec::new()
        }
    };

    for stream in streams {
        let path = create_temp_file_path(temp_dir, "subtitle", "srt");
        if let Err(e) = toolkit.extract_stream(video, stream.index, &path) {
            warn!("Extracting subtitle stream {} failed: {e}", stream.index);
            continue;
        }
        let source = SubtitleSource::Embedded {
            stream_index: stream.index,
            codec: stream.codec,
            path,
        };
        match load_segments(source.path()) {
            Ok(segments) if !segments.is_empty() => {
                info!("Using subtitles from {source} ({} segments)", segments.len());
                return Ok(ResolvedSubtitles { source, segments });
            }
            Ok(_) => warn!("{source} contains no usable subtitles"),
            Err(e) => warn!("Cannot use {source}: {e}"),
        }
    }

    Err(CoreError::NoSubtitlesFound(format!(
        "no sidecar or embedded text subtitles for {}",
        video.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockToolkit, ToolCall};

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n";

    fn languages() -> Vec<String> {
        ["en", "fr", "es", "de", "it"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_stream_preference_default_then_index() {
        let json = r#"{"streams": [
            {"index": 0, "codec_name": "h264", "codec_type": "video"},
            {"index": 3, "codec_name": "subrip", "codec_type": "subtitle", "disposition": {"default": 0}},
            {"index": 4, "codec_name": "hdmv_pgs_subtitle", "codec_type": "subtitle", "disposition": {"default": 1}},
            {"index": 5, "codec_name": "mov_text", "codec_type": "subtitle", "disposition": {"default": 1}}
        ]}"#;
        let streams = parse_subtitle_streams(json).unwrap();
        let order: Vec<u32> = streams.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![5, 3]);
    }

    #[test]
    fn test_stream_listing_rejects_bad_json() {
        assert!(matches!(parse_subtitle_streams("not json"), Err(CoreError::JsonParseError(_))));
    }

    #[test]
    fn test_sidecar_order() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mkv");
        std::fs::write(&video, b"v").unwrap();
        for name in ["movie.pt.srt", "movie.fr.srt", "movie.srt", "movie.en.srt", "other.srt"] {
            std::fs::write(dir.path().join(name), SRT).unwrap();
        }

        let names: Vec<String> = sidecar_candidates(&video, &languages())
            .iter()
            .map(|s| s.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["movie.srt", "movie.en.srt", "movie.fr.srt", "movie.pt.srt"]);
    }

    #[test]
    fn test_language_tag_matches_any_case() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mkv");
        std::fs::write(&video, b"v").unwrap();
        for name in ["movie.Pt.srt", "movie.FR.srt", "movie.EN.srt"] {
            std::fs::write(dir.path().join(name), SRT).unwrap();
        }

        let found = sidecar_candidates(&video, &languages());
        let names: Vec<String> = found
            .iter()
            .map(|s| s.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["movie.EN.srt", "movie.FR.srt", "movie.Pt.srt"]);
        assert!(matches!(
            &found[0],
            SubtitleSource::LanguageSidecar { language, .. } if language == "en"
        ));
    }

    #[test]
    fn test_empty_sidecar_falls_through_to_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mp4");
        std::fs::write(&video, b"v").unwrap();
        std::fs::write(dir.path().join("movie.srt"), "garbage without timing\n").unwrap();

        let toolkit = MockToolkit::new().with_embedded_subtitles(
            r#"{"streams": [{"index": 2, "codec_name": "subrip", "codec_type": "subtitle"}]}"#,
            SRT,
        );
        let resolved = locate_subtitles(&toolkit, &video, dir.path(), &languages()).unwrap();
        assert!(matches!(resolved.source, SubtitleSource::Embedded { stream_index: 2, .. }));
        assert_eq!(resolved.segments.len(), 1);
        assert!(toolkit.calls().iter().any(|c| matches!(c, ToolCall::Extract { index: 2, .. })));
    }

    #[test]
    fn test_sidecar_wins_without_probing() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mp4");
        std::fs::write(&video, b"v").unwrap();
        std::fs::write(dir.path().join("movie.srt"), SRT).unwrap();

        let toolkit = MockToolkit::new();
        let resolved = locate_subtitles(&toolkit, &video, dir.path(), &languages()).unwrap();
        assert!(matches!(resolved.source, SubtitleSource::Sidecar(_)));
        assert!(toolkit.calls().is_empty());
    }

    #[test]
    fn test_no_subtitles_found() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mp4");
        std::fs::write(&video, b"v").unwrap();

        let err = locate_subtitles(&MockToolkit::new(), &video, dir.path(), &languages()).unwrap_err();
        assert!(matches!(err, CoreError::NoSubtitlesFound(_)));
    }
}
