//! Source media classification.
//!
//! The media type of a document decides whether the transcription stage
//! produces text that a human must review before analysis starts:
//! audio and video transcripts are machine-generated and need a pass,
//! everything else (documents, web pages, free text) is taken verbatim
//! and analysis can start automatically.

/// Media type tags accepted by the creation endpoint and stored on the
/// document row.
pub const MEDIA_TYPES: &[&str] = &["web", "audio", "video", "document", "freetext", "youtube"];

/// Allowed audio file extensions.
pub const AUDIO_FORMATS: &[&str] = &["mp3", "wav", "opus", "ogg", "oga", "m4a", "aiff"];

/// Allowed video file extensions.
pub const VIDEO_FORMATS: &[&str] = &["m4v", "mp4", "webm", "mpeg"];

/// Allowed document file extensions.
pub const DOC_FORMATS: &[&str] = &["pdf", "doc", "docx", "odt"];

/// Allowed plain-text file extensions.
pub const TEXT_FORMATS: &[&str] = &["txt", "htm", "html"];

/// Whether a media type is one this backend accepts.
pub fn is_supported(media_type: &str) -> bool {
    MEDIA_TYPES.contains(&media_type)
}

/// File extensions accepted for a media type, or `None` when the type
/// is not file-backed (web pages, YouTube links).
pub fn allowed_source_formats(media_type: &str) -> Option<&'static [&'static str]> {
    match media_type {
        "audio" => Some(AUDIO_FORMATS),
        "video" => Some(VIDEO_FORMATS),
        "document" => Some(DOC_FORMATS),
        "freetext" => Some(TEXT_FORMATS),
        _ => None,
    }
}

/// Whether the source URL names a file the media type can carry.
/// Non-file-backed types accept any URL.
pub fn source_matches_media_type(media_type: &str, source_url: &str) -> bool {
    match allowed_source_formats(media_type) {
        Some(formats) => source_extension(source_url)
            .is_some_and(|ext| formats.contains(&ext.as_str())),
        None => true,
    }
}

/// Lowercased extension of the file a URL points at, ignoring query
/// string and fragment.
fn source_extension(source_url: &str) -> Option<String> {
    let path = source_url
        .split(['?', '#'])
        .next()
        .unwrap_or(source_url);
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Whether the transcription of this media type must be reviewed by a
/// human before analysis. Audio and video transcripts are ASR output;
/// everything else is the source text itself.
pub fn requires_transcription_review(media_type: &str) -> bool {
    matches!(media_type, "audio" | "video")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_and_video_need_review() {
        assert!(requires_transcription_review("audio"));
        assert!(requires_transcription_review("video"));
    }

    #[test]
    fn textual_sources_skip_review() {
        assert!(!requires_transcription_review("document"));
        assert!(!requires_transcription_review("web"));
        assert!(!requires_transcription_review("freetext"));
        assert!(!requires_transcription_review("youtube"));
    }

    #[test]
    fn supported_media_types() {
        assert!(is_supported("document"));
        assert!(!is_supported("podcast"));
    }

    #[test]
    fn file_backed_types_check_the_extension() {
        assert!(source_matches_media_type(
            "document",
            "https://files.example.org/photosynthesis.pdf"
        ));
        assert!(source_matches_media_type(
            "audio",
            "https://files.example.org/lecture.MP3?token=abc"
        ));
        assert!(!source_matches_media_type(
            "audio",
            "https://files.example.org/photosynthesis.pdf"
        ));
        assert!(!source_matches_media_type(
            "document",
            "https://files.example.org/photosynthesis"
        ));
    }

    #[test]
    fn link_types_accept_any_url() {
        assert!(source_matches_media_type("web", "https://example.org/article"));
        assert!(source_matches_media_type(
            "youtube",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        ));
    }
}
