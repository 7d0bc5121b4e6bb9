use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use hls_player::{EventCallback, HlsError, HlsEvent, HlsPlayer, PlayerConfig};
use mp4_box::writer::{create_init_segment, create_media_segment, AudioTrackConfig, Mp4StreamConfig, VideoTrackConfig};
use tokio::{net::TcpListener, sync::mpsc};
use url::Url;

// ============================================================================
// Test server infrastructure
// ============================================================================

struct Fixture {
    media_playlist: String,
    stream: Vec<u8>,
    ranges: Mutex<Vec<String>>,
}

const MASTER: &str = "#EXTM3U
#EXT-X-VERSION:6
#EXT-X-STREAM-INF:BANDWIDTH=400000,RESOLUTION=426x240
low/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=1200000,RESOLUTION=854x480
mid/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=3000000,RESOLUTION=1280x720,CODECS=\"avc1.64001f,mp4a.40.2\"
high/index.m3u8
";

fn stream_config() -> Mp4StreamConfig {
    Mp4StreamConfig {
        video: Some(VideoTrackConfig {
            track_id: 1,
            width: 1280,
            height: 720,
            sps: vec![0x67, 0x64, 0x00, 0x1F, 0xAC, 0xD9, 0x40],
            pps: vec![0x68, 0xEB, 0xE3, 0xCB, 0x22, 0xC0],
        }),
        audio: Some(AudioTrackConfig {
            track_id: 2,
            channel_count: 2,
            sample_rate: 48000,
            specific_config: vec![0x11, 0x90],
        }),
    }
}

fn nalu(payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

// One file holding the init segment and two media segments, addressed by byte ranges.
fn fixture() -> Fixture {
    let config = stream_config();
    let init = create_init_segment(&config);
    let keyframe = [nalu(&[0x09, 0xF0]), nalu(&[0x65, 0x88, 0x84, 0x00])].concat();
    let frame = nalu(&[0x41, 0x9A, 0x02]);
    let segments = [
        create_media_segment(&config, 1, 0, &[keyframe.clone(), frame.clone()], &[vec![0xA1; 24], vec![0xA2; 20]]),
        create_media_segment(&config, 2, 2000, &[keyframe, frame.clone(), frame], &[vec![0xB1; 18]]),
    ];

    let mut media_playlist = format!(
        "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXT-X-VERSION:6\n#EXT-X-MAP:URI=\"stream.mp4\",BYTERANGE=\"{}@0\"\n",
        init.len()
    );
    let mut stream = init;
    for segment in &segments {
        media_playlist.push_str(&format!("#EXTINF:2.0,\n#EXT-X-BYTERANGE:{}@{}\nstream.mp4\n", segment.len(), stream.len()));
        stream.extend_from_slice(segment);
    }

    Fixture { media_playlist, stream, ranges: Mutex::new(Vec::new()) }
}

async fn master_endpoint() -> &'static str {
    MASTER
}

async fn media_endpoint(State(fixture): State<Arc<Fixture>>) -> String {
    fixture.media_playlist.clone()
}

async fn stream_endpoint(State(fixture): State<Arc<Fixture>>, headers: HeaderMap) -> impl IntoResponse {
    let Some(range) = headers.get(header::RANGE).and_then(|value| value.to_str().ok()) else {
        return (StatusCode::OK, fixture.stream.clone());
    };
    fixture.ranges.lock().unwrap().push(range.to_string());

    let bounds = range
        .strip_prefix("bytes=")
        .and_then(|range| range.split_once('-'))
        .and_then(|(start, end)| Some((start.parse::<usize>().ok()?, end.parse::<usize>().ok()?)));
    match bounds {
        Some((start, end)) if start <= end && end < fixture.stream.len() => {
            (StatusCode::PARTIAL_CONTENT, fixture.stream[start..=end].to_vec())
        }
        _ => (StatusCode::RANGE_NOT_SATISFIABLE, Vec::new()),
    }
}

async fn serve(fixture: Arc<Fixture>) -> Url {
    let router = Router::new()
        .route("/live/master.m3u8", get(master_endpoint))
        .route("/live/high/index.m3u8", get(media_endpoint))
        .route("/live/high/stream.mp4", get(stream_endpoint))
        .with_state(fixture);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Url::parse(&format!("http://{addr}/live/master.m3u8")).unwrap()
}

fn channel_callback() -> (EventCallback, mpsc::UnboundedReceiver<HlsEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: EventCallback = Arc::new(move |event| {
        let _ = tx.send(event);
    });
    (callback, rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<HlsEvent>) -> HlsEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn byte_range_stream_over_http() {
    let fixture = Arc::new(fixture());
    let manifest = serve(fixture.clone()).await;
    let (callback, mut rx) = channel_callback();

    let config = PlayerConfig::default().with_poll_interval(Duration::from_millis(20));
    let player = HlsPlayer::new(manifest.clone(), config, callback);
    let handle = player.start();

    // Default variant index 2 is the 720p rendition.
    match next_event(&mut rx).await {
        HlsEvent::VariantSelected { url, label, bandwidth } => {
            assert_eq!(url, manifest.join("high/index.m3u8").unwrap());
            assert_eq!(label, "1280x720");
            assert_eq!(bandwidth, 3_000_000);
        }
        other => panic!("expected VariantSelected, got {other:?}"),
    }

    match next_event(&mut rx).await {
        HlsEvent::Tracks(info) => {
            let video = info.video.unwrap();
            assert_eq!((video.width, video.height), (1280, 720));
            assert_eq!(video.parameter_sets.len(), 2);
            let audio = info.audio.unwrap();
            assert_eq!(audio.channel_count, 2);
            assert_eq!(audio.specific_config, vec![0x11, 0x90]);
        }
        other => panic!("expected Tracks, got {other:?}"),
    }

    let mut segments = Vec::new();
    while segments.len() < 2 {
        if let HlsEvent::Samples { segment, samples } = next_event(&mut rx).await {
            segments.push((segment, samples));
        }
    }

    let (first_segment, first) = &segments[0];
    assert_eq!(first_segment.url, manifest.join("high/stream.mp4").unwrap());
    assert_eq!(first.video[0].frames.len(), 2);
    assert_eq!(first.video[0].frames[0].nalus, vec![nalu(&[0x09, 0xF0]), nalu(&[0x65, 0x88, 0x84, 0x00])]);
    assert_eq!(first.audio[0].packets, vec![vec![0xA1; 24], vec![0xA2; 20]]);

    let (_, second) = &segments[1];
    assert_eq!(second.video[0].base_decode_time, 2000);
    let pts: Vec<_> = second.video[0].frames.iter().map(|frame| frame.pts_ms).collect();
    assert_eq!(pts, vec![84, 126, 168]);
    assert_eq!(second.audio[0].packets, vec![vec![0xB1; 18]]);

    // Give the poller a few refreshes; nothing new is listed, so nothing more is fetched.
    tokio::time::sleep(Duration::from_millis(100)).await;
    player.stop();
    assert_eq!(handle.await.unwrap(), Err(HlsError::Cancelled));

    let ranges = fixture.ranges.lock().unwrap().clone();
    assert_eq!(ranges.len(), 3, "{ranges:?}");
    assert!(ranges[0].starts_with("bytes=0-"));
    let expected_first = first_segment.byte_range.as_ref().map(|range| format!("bytes={range}"));
    assert_eq!(Some(&ranges[1]), expected_first.as_ref());
}

#[tokio::test]
async fn missing_variant_playlist_is_reported_once() {
    let fixture = Arc::new(fixture());
    let manifest = serve(fixture).await;
    let (callback, mut rx) = channel_callback();

    let config = PlayerConfig::default().with_variant_index(0);
    let player = HlsPlayer::new(manifest, config, callback);
    let result = player.start().await.unwrap();

    assert!(matches!(result, Err(HlsError::ManifestFetch(_))));
    assert!(matches!(next_event(&mut rx).await, HlsEvent::VariantSelected { .. }));
    assert!(matches!(next_event(&mut rx).await, HlsEvent::Error(HlsError::ManifestFetch(_))));
    assert!(rx.try_recv().is_err());
}
