// File: args.rs
use clap::{Parser, ValueEnum};
use hls_player::{FixedIndexSelector, HighestBandwidthSelector, LowestBandwidthSelector, PlayerConfig, VariantSelector};
use std::sync::Arc;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum LogLevel {
    Trace = 0, // Designates very fine-grained informational events, extremely verbose.
    Debug = 1, // Designates fine-grained informational events.
    Info = 2, // Designates informational messages.
    Warn = 3, // Designates hazardous situations.
    Error = 4, // Designates very serious errors.
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum Selection {
    Fixed, // The variant at --variant-index.
    Lowest, // The variant with the lowest BANDWIDTH.
    Highest, // The variant with the highest BANDWIDTH.
}

#[derive(Parser, Debug)]
#[command(version, about, long_about="A headless client that ingests an HLS stream and demuxes it into decoder input.")]
pub struct Args {
    #[arg(short, long, default_value = "http://localhost:8080/master.m3u8")]
    pub url: Url,
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,
    #[arg(short, long, default_value = "fixed")]
    pub selection: Selection,
    #[arg(short, long, default_value = "2")]
    pub variant_index: usize,
    #[arg(short, long, default_value = "330")]
    pub poll_interval_ms: u64,
    #[arg(long, default_value = "10")]
    pub done_history: usize,
    /// Stop after this many seconds; runs until Ctrl+C when absent.
    #[arg(short, long)]
    pub duration_secs: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}

pub fn get_log_level_filter(args: &Args) -> LevelFilter {
    // Map the LogLevel enum to the LevelFilter enum
    match args.log_level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

pub fn get_player_config(args: &Args) -> PlayerConfig {
    PlayerConfig::default()
        .with_poll_interval(Duration::from_millis(args.poll_interval_ms))
        .with_done_history(args.done_history)
        .with_variant_index(args.variant_index)
}

pub fn get_selector(args: &Args) -> Arc<dyn VariantSelector> {
    match args.selection {
        Selection::Fixed => Arc::new(FixedIndexSelector(args.variant_index)),
        Selection::Lowest => Arc::new(LowestBandwidthSelector),
        Selection::Highest => Arc::new(HighestBandwidthSelector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_player_defaults() {
        let args = Args::parse_from(["hls-ingest"]);
        assert_eq!(get_player_config(&args), PlayerConfig::default());
        assert_eq!(get_log_level_filter(&args), LevelFilter::INFO);
        assert_eq!(args.selection, Selection::Fixed);
        assert!(args.duration_secs.is_none());
    }

    #[test]
    fn flags_map_to_config() {
        let args = Args::parse_from([
            "hls-ingest",
            "--url",
            "https://cdn.example.com/a/master.m3u8",
            "--log-level",
            "debug",
            "--poll-interval-ms",
            "1000",
            "--variant-index",
            "0",
            "--duration-secs",
            "30",
        ]);
        let config = get_player_config(&args);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.variant_index, 0);
        assert_eq!(get_log_level_filter(&args), LevelFilter::DEBUG);
        assert_eq!(args.url.host_str(), Some("cdn.example.com"));
        assert_eq!(args.duration_secs, Some(30));
    }

    #[test]
    fn invalid_url_is_rejected() {
        assert!(Args::try_parse_from(["hls-ingest", "--url", "not a url"]).is_err());
    }
}
