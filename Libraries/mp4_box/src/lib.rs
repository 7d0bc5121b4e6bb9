//! # Fragmented MP4 demuxing
//!
//! An MP4 (ISO base media) file is a flat sequence of **boxes** (also called atoms). Each box
//! starts with an 8 byte header, a 4 byte big-endian size followed by a 4 byte ASCII type, and
//! the rest of the box is its payload. Container boxes (`moov`, `trak`, `moof`, `traf`, ...)
//! carry more boxes in their payload, so the tree is recovered by walking the payload again.
//!
//! ## What this library reads
//! A fragmented stream is delivered as:
//! - one **initialization segment** (`ftyp` + `moov`), describing each track and its codec
//!   configuration (H.264 parameter sets, AAC specific configuration);
//! - many **media segments**, each carrying one or more `moof` + `mdat` pairs. The `moof`
//!   describes how the samples inside the following `mdat` are laid out.
//!
//! ## Supported subset
//! Codec configuration is read at fixed offsets inside the first sample entry of `stsd`
//! (see [`boxes::stsd`]). That assumes a single-entry codec table with the parameter-set box
//! (`avcC`) or elementary stream descriptor (`esds`) directly after the fixed sample-entry
//! fields, which is what common packagers emit. Anything else is reported as a configuration
//! error rather than guessed at.
//!
//! ## Modules
//! - [`reader`]: the generic box walker ([`reader::parse_atoms`], [`reader::find_atom`]).
//! - [`boxes`]: the individual boxes this library understands, with their layout constants.
//! - [`track`]: track configuration extraction from an initialization segment.
//! - [`fragment`]: per-track sample extraction from media segments.
//! - [`nalu`]: splitting length-prefixed H.264 samples into NAL units.
//! - [`writer`]: builds segments in the supported layout, used by tests and the `mp4_box` tool.

pub mod boxes;
pub mod error;
pub mod fragment;
pub mod nalu;
pub mod reader;
pub mod track;
pub mod writer;

pub use error::Mp4Error;
pub use fragment::{extract_track_fragments, FragmentSampleTable, TrackFragment};
pub use nalu::split_nalus;
pub use reader::{find_atom, parse_atoms, Atom};
pub use track::{extract_headers, AudioConfig, Fmp4Info, TrackDescriptor, TrackType, VideoConfig};

pub fn format_fourcc(fourcc: &[u8; 4]) -> String {
    std::str::from_utf8(fourcc).unwrap_or("????").to_string()
}

pub fn format_capped_bytes(data: &[u8]) -> String {
    let capped = &data[..data.len().min(8)];
    if data.len() > 8 {
        format!("{:?} ...", capped)
    } else {
        format!("{:?}", capped)
    }
}

pub fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset.checked_add(2)?)
        .map(|bytes| u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset.checked_add(4)?)
        .map(|bytes| u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub fn read_i32_be(data: &[u8], offset: usize) -> Option<i32> {
    read_u32_be(data, offset).map(|value| value as i32)
}

pub fn read_u64_be(data: &[u8], offset: usize) -> Option<u64> {
    let high = read_u32_be(data, offset)? as u64;
    let low = read_u32_be(data, offset + 4)? as u64;
    Some((high << 32) | low)
}

pub fn read_version_and_flags(data: &[u8]) -> Option<(u8, u32)> {
    let header = data.get(0..4)?;
    let flags = ((header[1] as u32) << 16) | ((header[2] as u32) << 8) | header[3] as u32;
    Some((header[0], flags))
}

pub fn write_version_and_flags(buffer: &mut Vec<u8>, version: u8, flags: u32) {
    buffer.push(version);
    buffer.push(((flags >> 16) & 0xFF) as u8);
    buffer.push(((flags >> 8) & 0xFF) as u8);
    buffer.push((flags & 0xFF) as u8);
}
