//! Track configuration extraction from an initialization segment.
//!
//! The `moov` box is walked once per stream: every `trak` is classified by its handler type,
//! its ID is read from `tkhd`, and the first sample entry of its `stsd` gives the codec
//! configuration a hardware decoder needs to start.

use crate::{
    boxes::{
        hdlr::HdlrBox,
        stsd::{first_sample_entry, AudioSampleEntry, VisualSampleEntry},
        tkhd::TkhdBox,
    },
    error::Mp4Error,
    format_capped_bytes, format_fourcc,
    reader::{find_atom, parse_atoms, Atom},
};
use tracing::debug;

/// AAC-LC; the only AAC profile this library hands to decoders.
pub const AAC_LC_OBJECT_TYPE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackType {
    Video,
    Audio,
}

impl TrackType {
    /// Maps a handler type to a track type. Handlers other than `vide` and `soun`
    /// (subtitles, timed metadata, ...) are not demuxed.
    pub fn from_handler(handler_type: &[u8; 4]) -> Option<Self> {
        match handler_type {
            b"vide" => Some(TrackType::Video),
            b"soun" => Some(TrackType::Audio),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackDescriptor {
    pub track_id: i32,
    pub track_type: TrackType,
}

/// H.264 decoder configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoConfig {
    pub track_id: i32,
    /// SPS, then PPS.
    pub parameter_sets: Vec<Vec<u8>>,
    pub width: u16,
    pub height: u16,
}

impl VideoConfig {
    pub fn sps(&self) -> &[u8] {
        self.parameter_sets.first().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn pps(&self) -> &[u8] {
        self.parameter_sets.get(1).map(Vec::as_slice).unwrap_or_default()
    }
}

impl std::fmt::Debug for VideoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoConfig")
            .field("track_id", &self.track_id)
            .field("sps", &format_capped_bytes(self.sps()))
            .field("pps", &format_capped_bytes(self.pps()))
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// AAC decoder configuration.
#[derive(Clone, PartialEq)]
pub struct AudioConfig {
    pub track_id: i32,
    pub sample_rate: f64,
    pub channel_count: u32,
    pub object_type: u32,
    pub specific_config: Vec<u8>,
}

impl std::fmt::Debug for AudioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioConfig")
            .field("track_id", &self.track_id)
            .field("sample_rate", &self.sample_rate)
            .field("channel_count", &self.channel_count)
            .field("object_type", &self.object_type)
            .field("specific_config", &format_capped_bytes(&self.specific_config))
            .finish()
    }
}

/// Everything the initialization segment says about the stream. Built once, read-only after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fmp4Info {
    pub video: Option<VideoConfig>,
    pub audio: Option<AudioConfig>,
}

impl Fmp4Info {
    pub fn tracks(&self) -> Vec<TrackDescriptor> {
        let video = self.video.as_ref().map(|video| TrackDescriptor {
            track_id: video.track_id,
            track_type: TrackType::Video,
        });
        let audio = self.audio.as_ref().map(|audio| TrackDescriptor {
            track_id: audio.track_id,
            track_type: TrackType::Audio,
        });
        video.into_iter().chain(audio).collect()
    }
}

/// Reads the track configuration out of an initialization segment.
///
/// Any box the layout requires (`moov`, `mdia/hdlr`, `tkhd`, `mdia/minf/stbl/stsd`, the
/// sample entry and its configuration box) missing or truncated fails the whole segment.
/// When the segment carries several tracks of one type, the first one is used.
pub fn extract_headers(data: &[u8]) -> Result<Fmp4Info, Mp4Error> {
    let moov = parse_atoms(data)
        .into_iter()
        .find(|atom| atom.is(b"moov"))
        .ok_or_else(|| Mp4Error::config("no moov box in initialization segment"))?;

    let mut info = Fmp4Info::default();

    for trak in moov.children().into_iter().filter(|atom| atom.is(b"trak")) {
        let hdlr = find_atom(trak.content, &[b"mdia", b"hdlr"])
            .ok_or_else(|| Mp4Error::config("trak without mdia/hdlr"))?;
        let handler = HdlrBox::read(hdlr.content)
            .ok_or_else(|| Mp4Error::config("hdlr box too short"))?;
        let Some(track_type) = TrackType::from_handler(&handler.handler_type) else {
            debug!("Skipping track with handler {}", format_fourcc(&handler.handler_type));
            continue;
        };

        let tkhd = trak
            .child(b"tkhd")
            .ok_or_else(|| Mp4Error::config("trak without tkhd"))?;
        let track_id = TkhdBox::read(tkhd.content)
            .ok_or_else(|| Mp4Error::config("tkhd box too short"))?
            .track_id;

        let entry = sample_entry(trak)?;

        match track_type {
            TrackType::Video if info.video.is_none() => {
                let visual = VisualSampleEntry::read(entry)
                    .map_err(|reason| Mp4Error::config(format!("video track {track_id}: {reason}")))?;
                debug!("video: {}x{}px, track {}", visual.width, visual.height, track_id);
                info.video = Some(VideoConfig {
                    track_id,
                    parameter_sets: vec![visual.avcc.sps, visual.avcc.pps],
                    width: visual.width,
                    height: visual.height,
                });
            }
            TrackType::Audio if info.audio.is_none() => {
                let audio = AudioSampleEntry::read(entry)
                    .map_err(|reason| Mp4Error::config(format!("audio track {track_id}: {reason}")))?;
                debug!("audio: {}ch {}Hz, track {}", audio.channel_count, audio.sample_rate, track_id);
                info.audio = Some(AudioConfig {
                    track_id,
                    sample_rate: audio.sample_rate as f64,
                    channel_count: audio.channel_count as u32,
                    object_type: AAC_LC_OBJECT_TYPE,
                    specific_config: audio.esds.specific_config,
                });
            }
            _ => debug!("Ignoring additional {:?} track {}", track_type, track_id),
        }
    }

    if info.video.is_none() && info.audio.is_none() {
        return Err(Mp4Error::config("no audio or video track in moov"));
    }

    Ok(info)
}

fn sample_entry<'a>(trak: Atom<'a>) -> Result<Atom<'a>, Mp4Error> {
    let stsd = find_atom(trak.content, &[b"mdia", b"minf", b"stbl", b"stsd"])
        .ok_or_else(|| Mp4Error::config("trak without mdia/minf/stbl/stsd"))?;
    first_sample_entry(stsd.content).ok_or_else(|| Mp4Error::config("stsd has no sample entry"))
}
