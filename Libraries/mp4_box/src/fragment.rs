//! Per-track sample extraction from media segments.
//!
//! A media segment holds `moof` + `mdat` pairs. For the requested track, each `moof` yields a
//! [`FragmentSampleTable`]; the next `mdat` is then cut into samples according to that table.

use crate::{
    boxes::{
        tfdt::TfdtBox,
        tfhd::TfhdBox,
        trun::{TrunBox, TrunLayout},
    },
    error::Mp4Error,
    reader::{parse_atoms, Atom},
    track::{TrackDescriptor, TrackType},
};
use tracing::trace;

/// Where one track's samples sit in the `mdat` that follows a `moof`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSampleTable {
    pub track_id: i32,
    pub base_decode_time: u64,
    pub sample_sizes: Vec<u32>,
    pub data_offset: u32,
}

/// The coded samples of one track from one `moof` + `mdat` pair, in decode order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFragment {
    pub track_id: i32,
    pub base_decode_time: u64,
    pub samples: Vec<Vec<u8>>,
}

fn trun_layout(track_type: TrackType) -> TrunLayout {
    match track_type {
        TrackType::Video => TrunLayout::Video,
        TrackType::Audio => TrunLayout::Audio,
    }
}

/// Reads the sample table for `track` out of a `moof`. Returns `None` when the `moof` has no
/// `traf` for the track, or the matching `traf` lacks its `tfdt` or `trun`.
pub fn read_sample_table(moof: Atom<'_>, track: TrackDescriptor) -> Option<FragmentSampleTable> {
    moof.children()
        .into_iter()
        .filter(|atom| atom.is(b"traf"))
        .find_map(|traf| {
            let tfhd = TfhdBox::read(traf.child(b"tfhd")?.content)?;
            if tfhd.track_id != track.track_id {
                return None;
            }
            let tfdt = TfdtBox::read(traf.child(b"tfdt")?.content)?;
            let trun = TrunBox::read(traf.child(b"trun")?.content, trun_layout(track.track_type))?;

            Some(FragmentSampleTable {
                track_id: track.track_id,
                base_decode_time: tfdt.base_decode_time,
                sample_sizes: trun.sample_sizes,
                data_offset: trun.data_offset,
            })
        })
}

/// Extracts the samples of `track` from every `moof` + `mdat` pair in a media segment.
///
/// Video samples are cut from the start of the `mdat` payload. Audio samples are cut from
/// `data` itself, starting at the `trun` data offset, which the packager writes relative to
/// the start of the segment. An `mdat` not preceded by a `moof` carrying the track is skipped.
///
/// Each pair produces its own result so a broken fragment does not take the others down.
pub fn extract_track_fragments(data: &[u8], track: TrackDescriptor) -> Vec<Result<TrackFragment, Mp4Error>> {
    let mut pending: Option<FragmentSampleTable> = None;
    let mut fragments = Vec::new();

    for atom in parse_atoms(data) {
        if atom.is(b"moof") {
            pending = read_sample_table(atom, track);
        } else if atom.is(b"mdat") {
            let Some(table) = pending.take() else {
                trace!("No sample table for track {} before mdat, skipping", track.track_id);
                continue;
            };
            let fragment = match track.track_type {
                TrackType::Video => slice_samples(atom.content, 0, table),
                TrackType::Audio => {
                    let offset = table.data_offset as usize;
                    slice_samples(data, offset, table)
                }
            };
            fragments.push(fragment);
        }
    }

    fragments
}

fn slice_samples(source: &[u8], start: usize, table: FragmentSampleTable) -> Result<TrackFragment, Mp4Error> {
    let mut offset = start;
    let mut samples = Vec::with_capacity(table.sample_sizes.len());

    for (index, &size) in table.sample_sizes.iter().enumerate() {
        let end = offset.saturating_add(size as usize);
        let sample = source.get(offset..end).ok_or_else(|| {
            Mp4Error::sample(
                table.track_id,
                format!("sample {index} ({size} bytes at offset {offset}) runs past the {} bytes available", source.len()),
            )
        })?;
        samples.push(sample.to_vec());
        offset = end;
    }

    Ok(TrackFragment {
        track_id: table.track_id,
        base_decode_time: table.base_decode_time,
        samples,
    })
}
