// This module contains the MP4 boxes the demuxer reads, together with the byte layout each
// one is assumed to have. Offsets are relative to the box payload (the bytes after the 8 byte
// header), which is what `reader::parse_atoms` hands out.
//
// The following submodules are included:
//
// - `generic`: Contains the `Mp4Box` trait, which provides a common interface for all MP4 boxes.
// - `tkhd`: Defines the Track Header Box, which carries the track ID.
// - `hdlr`: Defines the Handler Reference Box, which tells video tracks (`vide`) from audio tracks (`soun`).
// - `stsd`: Defines the Sample Description Box and the visual/audio sample entries inside it.
// - `avcc`: Defines the AVC Configuration Box, which carries the H.264 SPS and PPS.
// - `esds`: Defines the Elementary Stream Descriptor Box, which carries the AAC specific configuration.
// - `tfhd`: Defines the Track Fragment Header Box, which identifies the track of a fragment.
// - `tfdt`: Defines the Track Fragment Decode Time Box, which specifies the decode time of a track fragment.
// - `trun`: Defines the Track Fragment Run Box, which lists the sample sizes of a track fragment.

pub mod avcc;
pub mod esds;
pub mod generic;
pub mod hdlr;
pub mod stsd;
pub mod tfdt;
pub mod tfhd;
pub mod tkhd;
pub mod trun;
