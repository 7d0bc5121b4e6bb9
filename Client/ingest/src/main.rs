use hls_ingest::args::{get_log_level_filter, get_player_config, get_selector, parse_args};
use hls_ingest::sink::EventSink;
use hls_player::{EventCallback, HlsError, HlsPlayer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[tokio::main]
async fn main() {
    let args = parse_args();

    // Build the FmtSubscriber layer
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_filter(get_log_level_filter(&args));

    let subscriber = tracing_subscriber::registry().with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global default subscriber");

    info!("Starting HLS ingest client (headless)");
    info!("{:?}", args);

    let sink = EventSink::new();
    let callback: EventCallback = {
        let sink = Arc::clone(&sink);
        Arc::new(move |event| sink.handle(event))
    };

    let player = HlsPlayer::new(args.url.clone(), get_player_config(&args), callback)
        .with_selector(get_selector(&args));
    let mut handle = player.start();
    info!("Player started");

    let stop_after = async {
        match args.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    let finished = tokio::select! {
        result = &mut handle => Some(result),
        _ = stop_after => None,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C received, stopping");
            None
        }
    };
    let result = match finished {
        Some(result) => result,
        None => {
            player.stop();
            handle.await
        }
    };

    let stats = sink.stats();
    info!("Ingest finished: {:?}", stats);

    match result {
        Ok(Ok(())) | Ok(Err(HlsError::Cancelled)) => {}
        Ok(Err(e)) => {
            error!("Ingest of {} failed: {}", args.url, e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Player task panicked: {}", e);
            std::process::exit(1);
        }
    }
}
