use crate::{read_u32_be, write_version_and_flags};

use super::generic::Mp4Box;

pub const SAMPLE_COUNT_OFFSET: usize = 4;
pub const DATA_OFFSET_OFFSET: usize = 8;
pub const SAMPLE_RECORDS_OFFSET: usize = 12;

/// How the per-sample records of a `trun` are laid out. The layout is tied to the track type
/// rather than decoded from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrunLayout {
    /// 4 byte records holding only the sample size (flags `0x000201`).
    Audio,
    /// 12 byte records, sample size first; the other two fields are ignored (flags `0x000E01`).
    Video,
}

impl TrunLayout {
    pub fn record_size(self) -> usize {
        match self {
            TrunLayout::Audio => 4,
            TrunLayout::Video => 12,
        }
    }

    fn flags(self) -> u32 {
        match self {
            TrunLayout::Audio => 0x000201,
            TrunLayout::Video => 0x000E01,
        }
    }
}

// The `TrunBox` struct represents a Track Fragment Run Box in the MP4 file format.
//
// Fields:
// - `layout`: audio or video record layout.
// - `data_offset`: where the first sample starts. Audio readers take it relative to the start
//   of the fetched segment; video readers ignore it and start at the `mdat` payload.
// - `sample_sizes`: one entry per sample, in decode order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrunBox { // Track Fragment Run Box
    pub layout: TrunLayout,
    pub data_offset: u32,
    pub sample_sizes: Vec<u32>,
}

impl TrunBox {
    /// Reads the record table. The sample count bounds the number of records; a trailing
    /// partial record is ignored.
    pub fn read(content: &[u8], layout: TrunLayout) -> Option<Self> {
        let sample_count = read_u32_be(content, SAMPLE_COUNT_OFFSET)? as usize;
        let data_offset = read_u32_be(content, DATA_OFFSET_OFFSET)?;
        let records = content.get(SAMPLE_RECORDS_OFFSET..)?;

        let sample_sizes = records
            .chunks_exact(layout.record_size())
            .take(sample_count)
            .map(|record| u32::from_be_bytes([record[0], record[1], record[2], record[3]]))
            .collect();

        Some(TrunBox { layout, data_offset, sample_sizes })
    }
}

impl Mp4Box for TrunBox {
    fn box_type(&self) -> [u8; 4] { *b"trun" }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        write_version_and_flags(buffer, 0, self.layout.flags());
        buffer.extend_from_slice(&(self.sample_sizes.len() as u32).to_be_bytes());
        buffer.extend_from_slice(&self.data_offset.to_be_bytes());
        for size in &self.sample_sizes {
            buffer.extend_from_slice(&size.to_be_bytes());
            if self.layout == TrunLayout::Video {
                buffer.extend_from_slice(&[0; 8]);  // sample flags + composition offset
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_of(trun: &TrunBox) -> Vec<u8> {
        let mut content = Vec::new();
        trun.write_content(&mut content);
        content
    }

    #[test]
    fn audio_records_are_plain_sizes() {
        let trun = TrunBox { layout: TrunLayout::Audio, data_offset: 640, sample_sizes: vec![371, 372, 9] };
        let content = content_of(&trun);
        assert_eq!(content.len(), 12 + 3 * 4);
        assert_eq!(TrunBox::read(&content, TrunLayout::Audio), Some(trun));
    }

    #[test]
    fn video_records_take_first_word() {
        let trun = TrunBox { layout: TrunLayout::Video, data_offset: 0, sample_sizes: vec![5120, 88] };
        let content = content_of(&trun);
        assert_eq!(content.len(), 12 + 2 * 12);
        assert_eq!(TrunBox::read(&content, TrunLayout::Video).unwrap().sample_sizes, vec![5120, 88]);
    }

    #[test]
    fn sample_count_and_partial_records_bound_the_table() {
        let trun = TrunBox { layout: TrunLayout::Video, data_offset: 0, sample_sizes: vec![10, 20, 30] };
        let mut content = content_of(&trun);
        content.truncate(content.len() - 1);
        assert_eq!(TrunBox::read(&content, TrunLayout::Video).unwrap().sample_sizes, vec![10, 20]);

        let mut content = content_of(&trun);
        content[SAMPLE_COUNT_OFFSET..SAMPLE_COUNT_OFFSET + 4].copy_from_slice(&1u32.to_be_bytes());
        assert_eq!(TrunBox::read(&content, TrunLayout::Video).unwrap().sample_sizes, vec![10]);
    }

    #[test]
    fn header_shorter_than_records_offset_is_rejected() {
        assert!(TrunBox::read(&[0; 11], TrunLayout::Audio).is_none());
    }
}
