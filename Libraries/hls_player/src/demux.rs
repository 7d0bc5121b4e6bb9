//! Turns fetched segments into decoder input: codec configuration from the initialization
//! segment, then per-track samples from every media segment.

use mp4_box::{extract_headers, extract_track_fragments, split_nalus, Fmp4Info, Mp4Error, TrackType};
use tracing::{debug, warn};

/// Spacing of the placeholder video presentation times.
pub const PLACEHOLDER_FRAME_DURATION_MS: u64 = 42;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Placeholder presentation time, see [`Demuxer`].
    pub pts_ms: u64,
    /// NAL units of the frame, each still carrying its 4 byte length prefix.
    pub nalus: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFragment {
    pub track_id: i32,
    /// `tfdt` decode time, in the track timescale.
    pub base_decode_time: u64,
    pub frames: Vec<VideoFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFragment {
    pub track_id: i32,
    pub base_decode_time: u64,
    /// Always 0; audio is scheduled by the consumer.
    pub pts_ms: u64,
    /// Raw AAC access units.
    pub packets: Vec<Vec<u8>>,
}

/// The samples of one media segment. Fragments that failed extraction are left out and their
/// errors collected in `skipped`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentSamples {
    pub video: Vec<VideoFragment>,
    pub audio: Vec<AudioFragment>,
    pub skipped: Vec<Mp4Error>,
}

impl SegmentSamples {
    pub fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty()
    }
}

/// Per-session demuxer.
///
/// Presentation times are placeholders: every video frame advances a session-wide clock by
/// [`PLACEHOLDER_FRAME_DURATION_MS`] and audio reports 0. The real `tfdt` decode time is
/// passed along on each fragment for consumers that schedule on it.
#[derive(Debug, Default)]
pub struct Demuxer {
    info: Option<Fmp4Info>,
    next_video_pts_ms: u64,
}

impl Demuxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self) -> Option<&Fmp4Info> {
        self.info.as_ref()
    }

    /// Reads the track configuration. Replaces the previous one on success.
    pub fn on_init(&mut self, data: &[u8]) -> Result<Fmp4Info, Mp4Error> {
        let info = extract_headers(data)?;
        self.info = Some(info.clone());
        Ok(info)
    }

    /// Extracts the samples of every known track. Before [`Demuxer::on_init`] succeeded no
    /// track is known and the result is empty.
    pub fn on_segment(&mut self, data: &[u8]) -> SegmentSamples {
        let mut samples = SegmentSamples::default();
        let Some(tracks) = self.info.as_ref().map(Fmp4Info::tracks) else {
            warn!("Media segment received before the initialization segment, ignoring it");
            return samples;
        };

        for track in tracks {
            for fragment in extract_track_fragments(data, track) {
                let fragment = match fragment {
                    Ok(fragment) => fragment,
                    Err(e) => {
                        samples.skipped.push(e);
                        continue;
                    }
                };
                match track.track_type {
                    TrackType::Video => {
                        let frames = fragment
                            .samples
                            .iter()
                            .map(|sample| {
                                let pts_ms = self.next_video_pts_ms;
                                self.next_video_pts_ms += PLACEHOLDER_FRAME_DURATION_MS;
                                VideoFrame { pts_ms, nalus: split_nalus(sample) }
                            })
                            .collect();
                        samples.video.push(VideoFragment {
                            track_id: fragment.track_id,
                            base_decode_time: fragment.base_decode_time,
                            frames,
                        });
                    }
                    TrackType::Audio => samples.audio.push(AudioFragment {
                        track_id: fragment.track_id,
                        base_decode_time: fragment.base_decode_time,
                        pts_ms: 0,
                        packets: fragment.samples,
                    }),
                }
            }
        }

        debug!(
            "Demuxed {} video and {} audio fragments ({} skipped)",
            samples.video.len(),
            samples.audio.len(),
            samples.skipped.len()
        );
        samples
    }
}
