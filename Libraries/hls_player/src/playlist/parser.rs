use super::{MediaPlaylist, RangeUrl, Variant};
use crate::error::PlaylistError;
use tracing::debug;
use url::Url;

const STREAM_INF: &str = "#EXT-X-STREAM-INF:";
const MAP: &str = "#EXT-X-MAP:";
const MAP_URI: &str = "#EXT-X-MAP:URI=";
const BYTERANGE: &str = "#EXT-X-BYTERANGE";

/// True when the text looks like a master playlist.
pub fn is_master(text: &str) -> bool {
    text.contains(STREAM_INF)
}

/// Resolves a playlist reference. Absolute URLs are taken as-is, relative ones replace the
/// last path component of `base`.
pub fn resolve_url(base: &Url, reference: &str) -> Result<Url, PlaylistError> {
    base.join(reference.trim()).map_err(|e| PlaylistError::InvalidUrl {
        base: base.to_string(),
        reference: reference.to_string(),
        reason: e.to_string(),
    })
}

/// Converts an HLS `"len@off"` byte range into an inclusive `"off-end"` range.
/// Returns `None` for anything else, including an empty range.
pub fn parse_byte_range(input: &str) -> Option<String> {
    let (length, start) = input.trim().split_once('@')?;
    let length: u64 = length.trim().parse().ok()?;
    let start: u64 = start.trim().parse().ok()?;
    let end = start.checked_add(length.checked_sub(1)?)?;
    Some(format!("{start}-{end}"))
}

/// Splits an attribute list (`KEY=VALUE,KEY="quoted, value"`) on commas outside quotes.
/// Values are trimmed and unquoted; entries without `=` are dropped.
pub fn parse_attributes(list: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    let mut push = |entry: &str| {
        if let Some((key, value)) = entry.split_once('=') {
            let value = value.trim().trim_matches('"');
            attributes.push((key.trim().to_string(), value.to_string()));
        }
    };

    for (index, c) in list.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                push(&list[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    push(&list[start..]);

    attributes
}

fn is_uri_line(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}

/// Lists the variants of a master playlist in source order.
///
/// Each `#EXT-X-STREAM-INF` line sets the bandwidth and label of the URI line that follows it.
/// URI lines without a preceding `#EXT-X-STREAM-INF` and URIs that do not resolve are skipped.
pub fn parse_master(text: &str, base_url: &Url) -> Vec<Variant> {
    let mut variants = Vec::new();
    let mut current: Option<(String, u64)> = None;

    for line in text.lines().map(str::trim) {
        if let Some(list) = line.strip_prefix(STREAM_INF) {
            let mut label = String::new();
            let mut bandwidth = 0;
            for (key, value) in parse_attributes(list) {
                match key.as_str() {
                    "BANDWIDTH" => bandwidth = value.parse().unwrap_or(0),
                    "NAME" | "RESOLUTION" => label = value,
                    _ => {}
                }
            }
            current = Some((label, bandwidth));
        } else if is_uri_line(line) {
            let Some((label, bandwidth)) = current.take() else {
                debug!("Skipping URI without #EXT-X-STREAM-INF: {}", line);
                continue;
            };
            match resolve_url(base_url, line) {
                Ok(url) => variants.push(Variant { url, label, bandwidth }),
                Err(e) => debug!("Skipping variant: {}", e),
            }
        }
    }

    variants
}

/// Parses a media playlist. The grammar is picked from the text: `#EXT-X-BYTERANGE` anywhere
/// selects byte-range addressing, otherwise `#EXT-X-MAP:URI=` selects whole-file segments.
pub fn parse_media(text: &str, base_url: &Url) -> Result<MediaPlaylist, PlaylistError> {
    if text.contains(BYTERANGE) {
        parse_byte_range_media(text, base_url)
    } else if text.contains(MAP_URI) {
        parse_segment_media(text, base_url)
    } else {
        Err(PlaylistError::UnsupportedPlaylistFormat)
    }
}

fn parse_map(line: &str, base_url: &Url) -> Result<Option<RangeUrl>, PlaylistError> {
    let Some(list) = line.strip_prefix(MAP) else {
        return Ok(None);
    };
    let mut uri = None;
    let mut byte_range = None;
    for (key, value) in parse_attributes(list) {
        match key.as_str() {
            "URI" => uri = Some(value),
            "BYTERANGE" => byte_range = parse_byte_range(&value),
            _ => {}
        }
    }
    let Some(uri) = uri else {
        return Ok(None);
    };
    Ok(Some(RangeUrl::with_range(resolve_url(base_url, &uri)?, byte_range)))
}

fn push_segment(segments: &mut Vec<RangeUrl>, base_url: &Url, line: &str, byte_range: Option<String>) {
    match resolve_url(base_url, line) {
        Ok(url) => segments.push(RangeUrl::with_range(url, byte_range)),
        Err(e) => debug!("Skipping segment: {}", e),
    }
}

fn parse_byte_range_media(text: &str, base_url: &Url) -> Result<MediaPlaylist, PlaylistError> {
    let mut init_segment = None;
    let mut segments = Vec::new();
    let mut current_range: Option<String> = None;

    for line in text.lines().map(str::trim) {
        if line.starts_with(MAP) {
            init_segment = parse_map(line, base_url)?.or(init_segment);
        } else if let Some(range) = line.strip_prefix(BYTERANGE).and_then(|rest| rest.strip_prefix(':')) {
            current_range = parse_byte_range(range);
        } else if is_uri_line(line) {
            // A range applies to the next URI only; a URI without one is a whole file.
            push_segment(&mut segments, base_url, line, current_range.take());
        }
    }

    let init_segment = init_segment.ok_or(PlaylistError::MissingInitSegment)?;
    Ok(MediaPlaylist { init_segment, segments })
}

fn parse_segment_media(text: &str, base_url: &Url) -> Result<MediaPlaylist, PlaylistError> {
    let mut init_segment = None;
    let mut segments = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.starts_with(MAP) {
            init_segment = parse_map(line, base_url)?
                .map(|map| RangeUrl::new(map.url))
                .or(init_segment);
        } else if is_uri_line(line) {
            push_segment(&mut segments, base_url, line, None);
        }
    }

    let init_segment = init_segment.ok_or(PlaylistError::MissingInitSegment)?;
    Ok(MediaPlaylist { init_segment, segments })
}
