use crate::{
    format_fourcc,
    read_u16_be,
    reader::{parse_atoms, Atom},
    write_version_and_flags,
};

use super::{avcc::AvcCBox, esds::EsdsBox, generic::Mp4Box};

/// The first sample entry starts after version/flags and `entry_count`.
pub const SAMPLE_ENTRIES_OFFSET: usize = 8;

// Visual sample entry layout (`avc1`), offsets into the entry payload.
pub const VISUAL_WIDTH_OFFSET: usize = 24;
pub const VISUAL_HEIGHT_OFFSET: usize = 26;
/// Where the fixed visual fields end and the `avcC` box starts.
pub const VISUAL_CONFIG_BOX_OFFSET: usize = 78;

// Audio sample entry layout (`mp4a`), offsets into the entry payload.
pub const AUDIO_CHANNEL_COUNT_OFFSET: usize = 16;
/// Integer part of the 16.16 fixed-point sample rate.
pub const AUDIO_SAMPLE_RATE_OFFSET: usize = 24;
/// Where the fixed audio fields end and the `esds` box starts.
pub const AUDIO_DESCRIPTOR_BOX_OFFSET: usize = 28;

/// Returns the first sample entry of an `stsd` payload. Further entries are never looked at.
pub fn first_sample_entry(stsd_content: &[u8]) -> Option<Atom<'_>> {
    let entries = stsd_content.get(SAMPLE_ENTRIES_OFFSET..)?;
    parse_atoms(entries).into_iter().next()
}

// Finds the box that directly follows the fixed sample-entry fields and checks its type.
fn config_box<'a>(entry: &'a [u8], offset: usize, name: &[u8; 4]) -> Result<Atom<'a>, String> {
    let tail = entry
        .get(offset..)
        .ok_or_else(|| format!("sample entry shorter than {offset} bytes"))?;
    let atom = parse_atoms(tail)
        .into_iter()
        .next()
        .ok_or_else(|| format!("no box at offset {offset} of the sample entry"))?;
    if !atom.is(name) {
        return Err(format!(
            "expected {} at offset {offset}, found {}",
            format_fourcc(name),
            format_fourcc(&atom.name)
        ));
    }
    Ok(atom)
}

// The `VisualSampleEntry` struct represents a single `avc1` entry in the Sample Description Box.
//
// Fields:
// - `data_format`: the entry type, e.g. `avc1`.
// - `width` / `height`: coded size in pixels.
// - `avcc`: the parameter-set box found right after the fixed fields.
#[derive(Clone, PartialEq, Eq)]
pub struct VisualSampleEntry {
    pub data_format: [u8; 4],
    pub width: u16,
    pub height: u16,
    pub avcc: AvcCBox,
}

impl std::fmt::Debug for VisualSampleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualSampleEntry")
            .field("data_format", &format_fourcc(&self.data_format))
            .field("width", &self.width)
            .field("height", &self.height)
            .field("avcc", &self.avcc)
            .finish()
    }
}

impl VisualSampleEntry {
    pub fn read(entry: Atom<'_>) -> Result<Self, String> {
        let content = entry.content;
        let width = read_u16_be(content, VISUAL_WIDTH_OFFSET).ok_or("visual sample entry too short for width")?;
        let height = read_u16_be(content, VISUAL_HEIGHT_OFFSET).ok_or("visual sample entry too short for height")?;
        let avcc_atom = config_box(content, VISUAL_CONFIG_BOX_OFFSET, b"avcC")?;
        let avcc = AvcCBox::read(avcc_atom.content).ok_or("avcC parameter sets are truncated")?;
        Ok(VisualSampleEntry { data_format: entry.name, width, height, avcc })
    }
}

impl Mp4Box for VisualSampleEntry {
    fn box_type(&self) -> [u8; 4] { self.data_format }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&[0; 6]);  // reserved
        buffer.extend_from_slice(&1u16.to_be_bytes());  // data_reference_index
        buffer.extend_from_slice(&[0; 16]);  // pre_defined + reserved
        buffer.extend_from_slice(&self.width.to_be_bytes());
        buffer.extend_from_slice(&self.height.to_be_bytes());
        buffer.extend_from_slice(&0x0048_0000u32.to_be_bytes());  // 72 dpi
        buffer.extend_from_slice(&0x0048_0000u32.to_be_bytes());
        buffer.extend_from_slice(&[0; 4]);  // reserved
        buffer.extend_from_slice(&1u16.to_be_bytes());  // frame_count
        buffer.extend_from_slice(&[0; 32]);  // compressorname
        buffer.extend_from_slice(&0x0018u16.to_be_bytes());  // depth
        buffer.extend_from_slice(&(-1i16).to_be_bytes());  // pre_defined
        self.avcc.write_box(buffer);
    }
}

// The `AudioSampleEntry` struct represents a single `mp4a` entry in the Sample Description Box.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioSampleEntry {
    pub data_format: [u8; 4],
    pub channel_count: u16,
    pub sample_rate: u16,
    pub esds: EsdsBox,
}

impl std::fmt::Debug for AudioSampleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSampleEntry")
            .field("data_format", &format_fourcc(&self.data_format))
            .field("channel_count", &self.channel_count)
            .field("sample_rate", &self.sample_rate)
            .field("esds", &self.esds)
            .finish()
    }
}

impl AudioSampleEntry {
    pub fn read(entry: Atom<'_>) -> Result<Self, String> {
        let content = entry.content;
        let channel_count = read_u16_be(content, AUDIO_CHANNEL_COUNT_OFFSET).ok_or("audio sample entry too short for channel count")?;
        let sample_rate = read_u16_be(content, AUDIO_SAMPLE_RATE_OFFSET).ok_or("audio sample entry too short for sample rate")?;
        let esds_atom = config_box(content, AUDIO_DESCRIPTOR_BOX_OFFSET, b"esds")?;
        let esds = EsdsBox::read(esds_atom.content).ok_or("esds box too short")?;
        Ok(AudioSampleEntry { data_format: entry.name, channel_count, sample_rate, esds })
    }
}

impl Mp4Box for AudioSampleEntry {
    fn box_type(&self) -> [u8; 4] { self.data_format }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&[0; 6]);  // reserved
        buffer.extend_from_slice(&1u16.to_be_bytes());  // data_reference_index
        buffer.extend_from_slice(&[0; 8]);  // version, revision, vendor
        buffer.extend_from_slice(&self.channel_count.to_be_bytes());
        buffer.extend_from_slice(&16u16.to_be_bytes());  // sample size
        buffer.extend_from_slice(&[0; 4]);  // compression id, packet size
        buffer.extend_from_slice(&((self.sample_rate as u32) << 16).to_be_bytes());
        self.esds.write_box(buffer);
    }
}

// The `StsdBox` struct is the write side of the Sample Description Box: a single entry,
// which is the only layout the reader supports.
pub struct StsdBox<'a> {
    pub entry: &'a dyn Mp4Box,
}

impl Mp4Box for StsdBox<'_> {
    fn box_type(&self) -> [u8; 4] { *b"stsd" }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        write_version_and_flags(buffer, 0, 0);
        buffer.extend_from_slice(&1u32.to_be_bytes());  // entry_count
        self.entry.write_box(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stsd_content(entry: &dyn Mp4Box) -> Vec<u8> {
        let mut content = Vec::new();
        StsdBox { entry }.write_content(&mut content);
        content
    }

    fn avc1() -> VisualSampleEntry {
        VisualSampleEntry {
            data_format: *b"avc1",
            width: 416,
            height: 234,
            avcc: AvcCBox { sps: vec![0x67, 0x42, 0xC0, 0x1E], pps: vec![0x68, 0xCE] },
        }
    }

    #[test]
    fn visual_entry_fixed_fields_end_at_config_box() {
        let mut content = Vec::new();
        let entry = avc1();
        entry.write_content(&mut content);
        assert_eq!(&content[VISUAL_CONFIG_BOX_OFFSET + 4..VISUAL_CONFIG_BOX_OFFSET + 8], b"avcC");
    }

    #[test]
    fn reads_first_visual_entry() {
        let entry = avc1();
        let content = stsd_content(&entry);
        let atom = first_sample_entry(&content).unwrap();
        assert!(atom.is(b"avc1"));
        assert_eq!(VisualSampleEntry::read(atom).unwrap(), entry);
    }

    #[test]
    fn reads_first_audio_entry() {
        let entry = AudioSampleEntry {
            data_format: *b"mp4a",
            channel_count: 2,
            sample_rate: 44100,
            esds: EsdsBox { specific_config: vec![0x03, 0x80, 0x12, 0x10] },
        };
        let content = stsd_content(&entry);
        let atom = first_sample_entry(&content).unwrap();
        assert_eq!(&atom.content[AUDIO_DESCRIPTOR_BOX_OFFSET + 4..AUDIO_DESCRIPTOR_BOX_OFFSET + 8], b"esds");
        assert_eq!(AudioSampleEntry::read(atom).unwrap(), entry);
    }

    #[test]
    fn unexpected_box_after_fixed_fields_is_an_error() {
        let entry = AudioSampleEntry {
            data_format: *b"mp4a",
            channel_count: 1,
            sample_rate: 48000,
            esds: EsdsBox { specific_config: vec![1, 2] },
        };
        let mut content = stsd_content(&entry);
        let esds_type = SAMPLE_ENTRIES_OFFSET + 8 + AUDIO_DESCRIPTOR_BOX_OFFSET + 4;
        content[esds_type..esds_type + 4].copy_from_slice(b"wave");

        let atom = first_sample_entry(&content).unwrap();
        let err = AudioSampleEntry::read(atom).unwrap_err();
        assert!(err.contains("found wave"), "{err}");
    }

    #[test]
    fn empty_table_has_no_entry() {
        assert!(first_sample_entry(&[0, 0, 0, 0, 0, 0, 0, 0]).is_none());
        assert!(first_sample_entry(&[0, 0, 0]).is_none());
    }
}
