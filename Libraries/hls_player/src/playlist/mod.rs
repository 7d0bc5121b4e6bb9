//! HLS playlist data structures.
//! A master playlist lists variants; a media playlist lists one initialization segment and the
//! media segments of one variant, optionally as byte ranges inside a shared file.

pub mod parser;

use std::fmt;
use url::Url;

/// One download: a URL plus an optional inclusive byte range (`"start-end"`).
/// Two requests are the same segment only if both the URL and the range match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeUrl {
    pub url: Url,
    pub byte_range: Option<String>,
}

impl RangeUrl {
    pub fn new(url: Url) -> Self {
        Self { url, byte_range: None }
    }

    pub fn with_range(url: Url, byte_range: Option<String>) -> Self {
        Self { url, byte_range }
    }
}

impl fmt::Display for RangeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.byte_range {
            Some(range) => write!(f, "{} [{}]", self.url, range),
            None => write!(f, "{}", self.url),
        }
    }
}

/// A rendition listed by a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Absolute URL of the variant's media playlist.
    pub url: Url,
    /// `NAME` or `RESOLUTION`, whichever came last on the `#EXT-X-STREAM-INF` line. May be empty.
    pub label: String,
    /// `BANDWIDTH` in bits per second, 0 when absent or unparsable.
    pub bandwidth: u64,
}

/// The segments of one variant, in playlist order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPlaylist {
    pub init_segment: RangeUrl,
    pub segments: Vec<RangeUrl>,
}
