use std::env;
use std::fs;
use std::process;

use mp4_box::nalu::split_nalus;
use mp4_box::reader::{parse_atoms, Atom};
use mp4_box::track::{extract_headers, Fmp4Info};
use mp4_box::fragment::extract_track_fragments;
use mp4_box::writer::{create_init_segment, create_media_segment, AudioTrackConfig, Mp4StreamConfig, VideoTrackConfig};
use mp4_box::format_fourcc;

// Containers whose payload is a plain list of boxes.
const CONTAINERS: [&[u8; 4]; 8] = [b"moov", b"trak", b"mdia", b"minf", b"stbl", b"moof", b"traf", b"mvex"];

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <mp4_file> [init_file] | --test", args[0]);
        process::exit(1);
    }

    if args[1] == "--test" {
        run_test_mode();
    } else {
        run_file_mode(&args[1], args.get(2).map(String::as_str));
    }
}

fn read_file(filename: &str) -> Vec<u8> {
    match fs::read(filename) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to read file '{}': {}", filename, e);
            process::exit(1);
        }
    }
}

fn print_tree(atoms: &[Atom<'_>], depth: usize) {
    for atom in atoms {
        println!("{}{} ({} bytes)", "  ".repeat(depth), format_fourcc(&atom.name), atom.size);
        if CONTAINERS.iter().any(|name| atom.is(name)) {
            print_tree(&atom.children(), depth + 1);
        }
    }
}

fn print_fragments(data: &[u8], info: &Fmp4Info) {
    for track in info.tracks() {
        for fragment in extract_track_fragments(data, track) {
            match fragment {
                Ok(fragment) => {
                    let nalus: usize = match track.track_type {
                        mp4_box::TrackType::Video => fragment.samples.iter().map(|s| split_nalus(s).len()).sum(),
                        mp4_box::TrackType::Audio => 0,
                    };
                    println!(
                        "{:?} track {}: {} samples at decode time {} ({} NAL units)",
                        track.track_type,
                        fragment.track_id,
                        fragment.samples.len(),
                        fragment.base_decode_time,
                        nalus
                    );
                }
                Err(e) => eprintln!("{}", e),
            }
        }
    }
}

// Prints the box tree of `filename`. With an init segment (either the file itself or the
// second argument), also prints the track configuration and the samples found per track.
fn run_file_mode(filename: &str, init_filename: Option<&str>) {
    let data = read_file(filename);
    let atoms = parse_atoms(&data);

    println!("Parsed {} top-level boxes from '{}':\n", atoms.len(), filename);
    print_tree(&atoms, 0);

    let init = init_filename.map(read_file);
    let info = match extract_headers(init.as_deref().unwrap_or(&data[..])) {
        Ok(info) => info,
        Err(e) => {
            println!("\nNo track configuration: {}", e);
            return;
        }
    };
    println!("\n{:#?}\n", info);
    print_fragments(&data, &info);
}

fn run_test_mode() {
    println!("Running in TEST mode...");

    let config = Mp4StreamConfig {
        video: Some(VideoTrackConfig {
            track_id: 1,
            width: 1920,
            height: 1080,
            sps: vec![0x67, 0x64, 0x00, 0x28, 0xAC, 0xD9],
            pps: vec![0x68, 0xEB, 0xE3, 0xCB],
        }),
        audio: Some(AudioTrackConfig {
            track_id: 2,
            channel_count: 2,
            sample_rate: 48000,
            specific_config: vec![0x03, 0x19, 0x00, 0x02, 0x11, 0x90],
        }),
    };

    // 1️⃣ Create INIT segment
    let init_buffer = create_init_segment(&config);
    println!("Generated INIT segment ({} bytes)", init_buffer.len());
    print_tree(&parse_atoms(&init_buffer), 0);

    let info = match extract_headers(&init_buffer) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Failed to parse INIT segment: {}", e);
            process::exit(1);
        }
    };
    println!("\n{:#?}\n", info);

    // 2️⃣ Create MEDIA segment with static frame data
    let frame = [vec![0, 0, 0, 4], vec![0x65; 4], vec![0, 0, 0, 2, 0x06, 0x05]].concat();
    let video_samples = vec![frame; 3];
    let audio_samples = vec![vec![0x21u8; 128]; 4];
    let media_buffer = create_media_segment(&config, 1, 0, &video_samples, &audio_samples);
    println!("Generated MEDIA segment ({} bytes)", media_buffer.len());
    print_tree(&parse_atoms(&media_buffer), 0);

    // 3️⃣ Extract the samples back out
    println!();
    print_fragments(&media_buffer, &info);
}
