use thiserror::Error;

/// Errors raised while pulling track configuration or samples out of MP4 data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mp4Error {
    /// A box the initialization segment must carry is missing or too short.
    /// Playback cannot start without it.
    #[error("config extraction failed: {reason}")]
    ConfigExtraction { reason: String },

    /// A fragment describes samples that do not fit the data it came with.
    /// Only the affected track of that fragment is dropped.
    #[error("sample extraction failed for track {track_id}: {reason}")]
    SampleExtraction { track_id: i32, reason: String },
}

impl Mp4Error {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigExtraction { reason: reason.into() }
    }

    pub fn sample(track_id: i32, reason: impl Into<String>) -> Self {
        Self::SampleExtraction { track_id, reason: reason.into() }
    }
}
