use mp4_box::Mp4Error;
use thiserror::Error;

/// Failure of a single GET issued through a [`crate::SegmentFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("empty response body from {url}")]
    EmptyBody { url: String },
}

impl FetchError {
    pub fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport { url: url.into(), reason: reason.to_string() }
    }

    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status { url: url.into(), status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaylistError {
    #[error("unsupported playlist format: neither #EXT-X-BYTERANGE nor #EXT-X-MAP:URI= present")]
    UnsupportedPlaylistFormat,
    #[error("media playlist has no usable #EXT-X-MAP initialization segment")]
    MissingInitSegment,
    #[error("master playlist lists no variants")]
    NoVariants,
    #[error("cannot resolve {reference:?} against {base}: {reason}")]
    InvalidUrl { base: String, reference: String, reason: String },
    #[error("playlist is not valid UTF-8")]
    InvalidEncoding,
}

/// Everything that can stop a playback session.
///
/// [`HlsError::SampleExtraction`] only skips one fragment and is reported as a warning.
/// [`HlsError::Cancelled`] is the result of [`crate::HlsPlayer::stop`] and is never sent as
/// [`crate::HlsEvent::Error`]. Every other variant is fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HlsError {
    #[error("manifest fetch failed: {0}")]
    ManifestFetch(#[source] FetchError),
    #[error("playlist parse failed: {0}")]
    PlaylistParse(#[from] PlaylistError),
    #[error("{0}")]
    ConfigExtraction(#[source] Mp4Error),
    #[error("{0}")]
    SampleExtraction(#[source] Mp4Error),
    #[error("segment fetch failed: {0}")]
    SegmentFetch(#[source] FetchError),
    #[error("playback cancelled")]
    Cancelled,
}
