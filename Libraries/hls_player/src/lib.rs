//! Client-side HLS ingest for fragmented MP4 streams.
//!
//! [`HlsPlayer`] resolves a master playlist to one variant, fetches its initialization segment
//! and then every media segment in playlist order, polling the media playlist for new ones.
//! Each segment is demuxed with [`mp4_box`] and handed to the caller as [`HlsEvent`]s.

pub mod config;
pub mod demux;
pub mod error;
pub mod player;
pub mod playlist;
pub mod segment;
pub mod selector;

use mp4_box::Fmp4Info;
use url::Url;

/// Events emitted by the player
#[derive(Debug, Clone)]
pub enum HlsEvent {
    /// The master playlist was resolved to this variant.
    VariantSelected {
        url: Url,
        label: String,
        bandwidth: u64,
    },
    /// Codec configuration from the initialization segment. Sent once, before any samples.
    Tracks(Fmp4Info),
    /// The samples of one media segment, in playlist order.
    Samples {
        segment: playlist::RangeUrl,
        samples: demux::SegmentSamples,
    },
    Info(String),
    Warning(String),
    /// A fatal error. Nothing follows it.
    Error(error::HlsError),
}

pub use config::PlayerConfig;
pub use demux::{AudioFragment, Demuxer, SegmentSamples, VideoFragment, VideoFrame};
pub use error::{FetchError, HlsError, PlaylistError};
pub use player::{EventCallback, HlsPlayer};
pub use playlist::{MediaPlaylist, RangeUrl, Variant};
pub use segment::fetcher::{HttpFetcher, SegmentFetcher};
pub use segment::state::FetchState;
pub use selector::{FixedIndexSelector, HighestBandwidthSelector, LowestBandwidthSelector, VariantSelector};
