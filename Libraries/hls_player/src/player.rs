use crate::config::PlayerConfig;
use crate::demux::Demuxer;
use crate::error::{HlsError, PlaylistError};
use crate::playlist::parser::{is_master, parse_master, parse_media};
use crate::playlist::{MediaPlaylist, RangeUrl};
use crate::segment::fetcher::{HttpFetcher, SegmentFetcher};
use crate::segment::state::FetchState;
use crate::selector::{FixedIndexSelector, VariantSelector};
use crate::HlsEvent;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

pub type EventCallback = Arc<dyn Fn(HlsEvent) + Send + Sync>;

pub struct HlsPlayer {
    manifest_url: Url,
    config: PlayerConfig,
    callback: EventCallback,
    fetcher: Arc<dyn SegmentFetcher>,
    selector: Arc<dyn VariantSelector>,
    cancellation_token: CancellationToken,
}

impl HlsPlayer {
    /// Creates a player fetching over HTTP and picking `config.variant_index`.
    pub fn new(manifest_url: Url, config: PlayerConfig, callback: EventCallback) -> Self {
        Self {
            selector: Arc::new(FixedIndexSelector(config.variant_index)),
            fetcher: Arc::new(HttpFetcher::new()),
            manifest_url,
            config,
            callback,
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn SegmentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_selector(mut self, selector: Arc<dyn VariantSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Spawns the playback session on the current tokio runtime.
    ///
    /// The session only ends on [`HlsPlayer::stop`], which resolves the handle to
    /// `Err(HlsError::Cancelled)`, or on a fatal error, which is also sent as
    /// [`HlsEvent::Error`].
    pub fn start(&self) -> JoinHandle<Result<(), HlsError>> {
        let session = Session {
            manifest_url: self.manifest_url.clone(),
            config: self.config.clone(),
            callback: self.callback.clone(),
            fetcher: self.fetcher.clone(),
            selector: self.selector.clone(),
            state: FetchState::new(self.config.done_history),
            demuxer: Demuxer::new(),
        };
        tokio::spawn(session.run(self.cancellation_token.clone()))
    }

    /// Cancels every session started by this player. An in-flight fetch is dropped.
    pub fn stop(&self) {
        self.cancellation_token.cancel();
    }
}

enum Phase {
    AwaitingManifest,
    AwaitingInitSegment { media_url: Url, playlist: MediaPlaylist },
    Polling { media_url: Url },
}

// State owned by one spawned playback task.
struct Session {
    manifest_url: Url,
    config: PlayerConfig,
    callback: EventCallback,
    fetcher: Arc<dyn SegmentFetcher>,
    selector: Arc<dyn VariantSelector>,
    state: FetchState,
    demuxer: Demuxer,
}

impl Session {
    async fn run(mut self, cancellation_token: CancellationToken) -> Result<(), HlsError> {
        let result = tokio::select! {
            _ = cancellation_token.cancelled() => Err(HlsError::Cancelled),
            result = self.drive() => result,
        };

        match &result {
            Err(HlsError::Cancelled) => self.emit(HlsEvent::Info("Segment fetcher stopped.".to_string())),
            Err(e) => {
                error!("Playback of {} stopped: {}", self.manifest_url, e);
                self.emit(HlsEvent::Error(e.clone()));
            }
            Ok(()) => {}
        }
        result
    }

    fn emit(&self, event: HlsEvent) {
        (self.callback)(event);
    }

    async fn drive(&mut self) -> Result<(), HlsError> {
        let mut phase = Phase::AwaitingManifest;
        loop {
            phase = match phase {
                Phase::AwaitingManifest => self.resolve_manifest().await?,
                Phase::AwaitingInitSegment { media_url, playlist } => {
                    let added = self.state.enqueue(playlist.segments);
                    debug!("{} segments listed in {}", added, media_url);
                    if !self.state.init_segment_fetched() {
                        self.fetch_init_segment(&playlist.init_segment).await?;
                    }
                    Phase::Polling { media_url }
                }
                Phase::Polling { media_url } => {
                    self.poll(&media_url).await?;
                    Phase::Polling { media_url }
                }
            };
        }
    }

    async fn fetch_playlist(&self, url: &Url) -> Result<String, HlsError> {
        let body = self
            .fetcher
            .fetch(&RangeUrl::new(url.clone()))
            .await
            .map_err(HlsError::ManifestFetch)?;
        let text = std::str::from_utf8(&body).map_err(|_| PlaylistError::InvalidEncoding)?;
        Ok(text.to_owned())
    }

    async fn fetch_media_playlist(&self, url: &Url) -> Result<MediaPlaylist, HlsError> {
        let text = self.fetch_playlist(url).await?;
        Ok(parse_media(&text, url)?)
    }

    async fn resolve_manifest(&self) -> Result<Phase, HlsError> {
        let text = self.fetch_playlist(&self.manifest_url).await?;

        if !is_master(&text) {
            let playlist = parse_media(&text, &self.manifest_url).map_err(|e| match e {
                PlaylistError::UnsupportedPlaylistFormat => PlaylistError::NoVariants,
                other => other,
            })?;
            info!("{} is a media playlist, playing it directly", self.manifest_url);
            return Ok(Phase::AwaitingInitSegment { media_url: self.manifest_url.clone(), playlist });
        }

        let variants = parse_master(&text, &self.manifest_url);
        let variant = self
            .selector
            .select(&variants)
            .and_then(|index| variants.get(index))
            .cloned()
            .ok_or(PlaylistError::NoVariants)?;

        info!("Selected variant {} ({} bps) of {}", variant.url, variant.bandwidth, variants.len());
        self.emit(HlsEvent::VariantSelected {
            url: variant.url.clone(),
            label: variant.label,
            bandwidth: variant.bandwidth,
        });

        let playlist = self.fetch_media_playlist(&variant.url).await?;
        Ok(Phase::AwaitingInitSegment { media_url: variant.url, playlist })
    }

    async fn fetch_init_segment(&mut self, init_segment: &RangeUrl) -> Result<(), HlsError> {
        let data = self.fetcher.fetch(init_segment).await.map_err(HlsError::SegmentFetch)?;
        let info = self.demuxer.on_init(&data).map_err(HlsError::ConfigExtraction)?;
        self.state.mark_init_segment_fetched();

        info!("Initialization segment {} parsed: {:?}", init_segment, info.tracks());
        self.emit(HlsEvent::Tracks(info));
        Ok(())
    }

    // Drains the pending queue one segment at a time, then waits and refreshes the playlist.
    async fn poll(&mut self, media_url: &Url) -> Result<(), HlsError> {
        while let Some(segment) = self.state.begin_next() {
            let data = self.fetcher.fetch(&segment).await.map_err(HlsError::SegmentFetch)?;
            let samples = self.demuxer.on_segment(&data);
            for skipped in &samples.skipped {
                let reason = HlsError::SampleExtraction(skipped.clone()).to_string();
                warn!("{} in {}", reason, segment);
                self.emit(HlsEvent::Warning(reason));
            }

            self.state.complete(&segment);
            self.emit(HlsEvent::Samples { segment, samples });
        }

        sleep(self.config.poll_interval).await;

        let playlist = self.fetch_media_playlist(media_url).await?;
        let added = self.state.enqueue(playlist.segments);
        if added > 0 {
            debug!("{} new segments in {}", added, media_url);
        }
        Ok(())
    }
}
