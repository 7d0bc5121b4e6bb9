use hls_player::HlsEvent;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Running totals of what the player delivered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub segments: usize,
    pub video_frames: usize,
    pub nal_units: usize,
    pub audio_packets: usize,
    pub sample_bytes: usize,
    pub warnings: usize,
    pub failed: bool,
}

/// Stands in for the decoders: logs every player event and counts the decoder input.
#[derive(Default)]
pub struct EventSink {
    stats: Mutex<IngestStats>,
}

impl EventSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stats(&self) -> IngestStats {
        *self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn handle(&self, event: HlsEvent) {
        let mut stats = self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match event {
            HlsEvent::VariantSelected { url, label, bandwidth } => {
                info!("Playing variant '{}' at {} bps: {}", label, bandwidth, url);
            }
            HlsEvent::Tracks(tracks) => {
                if let Some(video) = &tracks.video {
                    info!("Video track {}: {}x{}, SPS {} bytes, PPS {} bytes", video.track_id, video.width, video.height, video.sps().len(), video.pps().len());
                }
                if let Some(audio) = &tracks.audio {
                    info!("Audio track {}: {} Hz, {} channels, object type {}", audio.track_id, audio.sample_rate, audio.channel_count, audio.object_type);
                }
            }
            HlsEvent::Samples { segment, samples } => {
                stats.segments += 1;
                for fragment in &samples.video {
                    for frame in &fragment.frames {
                        stats.video_frames += 1;
                        stats.nal_units += frame.nalus.len();
                        stats.sample_bytes += frame.nalus.iter().map(Vec::len).sum::<usize>();
                    }
                }
                for fragment in &samples.audio {
                    stats.audio_packets += fragment.packets.len();
                    stats.sample_bytes += fragment.packets.iter().map(Vec::len).sum::<usize>();
                }
                debug!(
                    "Segment {}: {} video fragments, {} audio fragments",
                    segment,
                    samples.video.len(),
                    samples.audio.len()
                );
            }
            HlsEvent::Info(msg) => {
                info!("Info: {}", msg);
            }
            HlsEvent::Warning(msg) => {
                stats.warnings += 1;
                warn!("Warning: {}", msg);
            }
            HlsEvent::Error(e) => {
                stats.failed = true;
                error!("Playback failed: {}", e);
            }
        }
    }
}
