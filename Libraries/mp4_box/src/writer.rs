//! Builds initialization and media segments in the layout the readers in this crate expect.
//! Used by the tests and the `mp4_box --test` tool to produce fixtures without a packager.

use crate::{
    boxes::{
        avcc::AvcCBox,
        esds::EsdsBox,
        generic::{write_atom, Mp4Box},
        hdlr::HdlrBox,
        stsd::{AudioSampleEntry, StsdBox, VisualSampleEntry},
        tfdt::TfdtBox,
        tfhd::TfhdBox,
        tkhd::TkhdBox,
        trun::{TrunBox, TrunLayout},
    },
    reader::ATOM_HEADER_SIZE,
    write_version_and_flags,
};

#[derive(Clone, Debug)]
pub struct VideoTrackConfig {
    pub track_id: i32,      // Keep below 256, fragments carry a single byte of it
    pub width: u16,         // Video width in pixels
    pub height: u16,        // Video height in pixels
    pub sps: Vec<u8>,       // H.264 sequence parameter set, without length prefix
    pub pps: Vec<u8>,       // H.264 picture parameter set, without length prefix
}

#[derive(Clone, Debug)]
pub struct AudioTrackConfig {
    pub track_id: i32,
    pub channel_count: u16,
    pub sample_rate: u16,           // Integer Hz, e.g. 48000
    pub specific_config: Vec<u8>,   // Written after the 4 byte esds version/flags
}

/// The tracks of a stream. Video is always written first.
#[derive(Clone, Debug, Default)]
pub struct Mp4StreamConfig {
    pub video: Option<VideoTrackConfig>,
    pub audio: Option<AudioTrackConfig>,
}

fn write_brands(buffer: &mut Vec<u8>, major: &[u8; 4], compatible: &[&[u8; 4]]) {
    buffer.extend_from_slice(major);
    buffer.extend_from_slice(&0u32.to_be_bytes());  // minor version
    for brand in compatible {
        buffer.extend_from_slice(*brand);
    }
}

fn write_trak(buffer: &mut Vec<u8>, track_id: i32, handler_type: [u8; 4], entry: &dyn Mp4Box) {
    write_atom(buffer, b"trak", |buffer| {
        TkhdBox { version: 0, track_id }.write_box(buffer);
        write_atom(buffer, b"mdia", |buffer| {
            HdlrBox { handler_type }.write_box(buffer);
            write_atom(buffer, b"minf", |buffer| {
                write_atom(buffer, b"stbl", |buffer| {
                    StsdBox { entry }.write_box(buffer);
                });
            });
        });
    });
}

pub fn create_init_segment(config: &Mp4StreamConfig) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(1024);

    // 1) Write FTYP Box
    write_atom(&mut buffer, b"ftyp", |buffer| write_brands(buffer, b"iso6", &[b"iso6", b"mp41"]));

    // 2) Write MOOV Box, one trak per configured track
    write_atom(&mut buffer, b"moov", |buffer| {
        if let Some(video) = &config.video {
            let entry = VisualSampleEntry {
                data_format: *b"avc1",
                width: video.width,
                height: video.height,
                avcc: AvcCBox { sps: video.sps.clone(), pps: video.pps.clone() },
            };
            write_trak(buffer, video.track_id, *b"vide", &entry);
        }
        if let Some(audio) = &config.audio {
            let entry = AudioSampleEntry {
                data_format: *b"mp4a",
                channel_count: audio.channel_count,
                sample_rate: audio.sample_rate,
                esds: EsdsBox { specific_config: audio.specific_config.clone() },
            };
            write_trak(buffer, audio.track_id, *b"soun", &entry);
        }
    });

    buffer
}

fn write_moof(
    config: &Mp4StreamConfig,
    sequence_number: u32,
    base_decode_time: u64,
    video_trun: &TrunBox,
    audio_trun: &TrunBox,
) -> Vec<u8> {
    let mut moof = Vec::new();
    write_atom(&mut moof, b"moof", |buffer| {
        write_atom(buffer, b"mfhd", |buffer| {
            write_version_and_flags(buffer, 0, 0);
            buffer.extend_from_slice(&sequence_number.to_be_bytes());
        });
        let tracks = [
            config.video.as_ref().map(|video| (video.track_id, video_trun)),
            config.audio.as_ref().map(|audio| (audio.track_id, audio_trun)),
        ];
        for (track_id, trun) in tracks.into_iter().flatten() {
            write_atom(buffer, b"traf", |buffer| {
                TfhdBox { track_id }.write_box(buffer);
                TfdtBox { version: 1, base_decode_time }.write_box(buffer);
                trun.write_box(buffer);
            });
        }
    });
    moof
}

/// Builds `styp` + `moof` + `mdat` holding the given samples of each configured track.
/// Video samples come first in the `mdat`, audio samples right after them.
///
/// The audio `trun` data offset is written relative to the start of the returned segment,
/// the video one relative to the `moof`.
pub fn create_media_segment(
    config: &Mp4StreamConfig,
    sequence_number: u32,
    base_decode_time: u64,
    video_samples: &[Vec<u8>],
    audio_samples: &[Vec<u8>],
) -> Vec<u8> {
    let mut segment = Vec::new();

    // 1) Write STYP Box
    write_atom(&mut segment, b"styp", |buffer| write_brands(buffer, b"msdh", &[b"msdh", b"msix"]));

    let mut video_trun = TrunBox {
        layout: TrunLayout::Video,
        data_offset: 0,
        sample_sizes: video_samples.iter().map(|sample| sample.len() as u32).collect(),
    };
    let mut audio_trun = TrunBox {
        layout: TrunLayout::Audio,
        data_offset: 0,
        sample_sizes: audio_samples.iter().map(|sample| sample.len() as u32).collect(),
    };

    // 2) Serialize MOOF once with placeholder offsets to learn its size
    let moof_len = write_moof(config, sequence_number, base_decode_time, &video_trun, &audio_trun).len();
    let video_len: usize = video_samples.iter().map(Vec::len).sum();

    // 3) Re-serialize MOOF with the real offsets; the size does not change
    video_trun.data_offset = (moof_len + ATOM_HEADER_SIZE) as u32;
    audio_trun.data_offset = (segment.len() + moof_len + ATOM_HEADER_SIZE + video_len) as u32;
    let moof = write_moof(config, sequence_number, base_decode_time, &video_trun, &audio_trun);
    segment.extend_from_slice(&moof);

    // 4) Write MDAT Box
    write_atom(&mut segment, b"mdat", |buffer| {
        for sample in video_samples.iter().chain(audio_samples) {
            buffer.extend_from_slice(sample);
        }
    });

    segment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_atoms;

    #[test]
    fn media_segment_layout() {
        let config = Mp4StreamConfig {
            video: Some(VideoTrackConfig { track_id: 1, width: 2, height: 2, sps: vec![1], pps: vec![2] }),
            audio: Some(AudioTrackConfig { track_id: 2, channel_count: 1, sample_rate: 8000, specific_config: vec![] }),
        };
        let segment = create_media_segment(&config, 1, 0, &[vec![0xAA; 3]], &[vec![0xBB; 2]]);

        let names: Vec<_> = parse_atoms(&segment).iter().map(|atom| atom.name).collect();
        assert_eq!(names, vec![*b"styp", *b"moof", *b"mdat"]);

        let moof = parse_atoms(&segment)[1];
        let trafs: Vec<_> = moof.children().into_iter().filter(|atom| atom.is(b"traf")).collect();
        assert_eq!(trafs.len(), 2);

        let audio_trun = TrunBox::read(trafs[1].child(b"trun").unwrap().content, TrunLayout::Audio).unwrap();
        let offset = audio_trun.data_offset as usize;
        assert_eq!(&segment[offset..], &[0xBB, 0xBB]);
    }

    #[test]
    fn init_segment_has_one_trak_per_track() {
        let config = Mp4StreamConfig {
            video: Some(VideoTrackConfig { track_id: 1, width: 2, height: 2, sps: vec![1], pps: vec![2] }),
            audio: None,
        };
        let init = create_init_segment(&config);
        let atoms = parse_atoms(&init);
        assert!(atoms[0].is(b"ftyp"));
        let traks = atoms[1].children().into_iter().filter(|atom| atom.is(b"trak")).count();
        assert_eq!(traks, 1);
    }
}
