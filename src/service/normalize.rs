//! Feed payload normalization
//!
//! Turns SubsPlease release entries into [`AnimeTorrent`]s, one per
//! resolution variant.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::magnet::parse_magnet;
use crate::provider::subsplease::{RawRelease, RELEASE_GROUP, SHOW_PAGE_BASE};
use crate::provider::{AnimeTorrent, ProviderError, Result};
use crate::utils::{format_size_label, parse_leading_u32};

/// Normalize one release into a torrent per download, in source order
///
/// `now` stands in for release dates the feed sends in a form we can't read.
pub fn normalize_release(release: &RawRelease, now: DateTime<Utc>) -> Vec<AnimeTorrent> {
    let episode_number = parse_leading_u32(&release.episode);
    let date = release
        .release_date
        .as_deref()
        .and_then(parse_release_date)
        .unwrap_or(now);
    let link = format!("{}{}", SHOW_PAGE_BASE, release.page.as_deref().unwrap_or(""));

    release
        .downloads
        .iter()
        .map(|download| {
            let magnet = parse_magnet(&download.magnet);
            let resolution = format!("{}p", download.res);
            let name = release_title(
                release,
                episode_number,
                &resolution,
                magnet.info_hash.as_deref(),
            );

            AnimeTorrent {
                name,
                date,
                size: magnet.size,
                formatted_size: format_size_label(magnet.size),
                seeders: None,
                leechers: None,
                download_count: 0,
                link: link.clone(),
                download_url: String::new(),
                magnet_link: download.magnet.clone(),
                info_hash: magnet.info_hash,
                resolution,
                is_batch: false,
                episode_number,
                release_group: RELEASE_GROUP.to_string(),
                is_best_release: false,
                confirmed: true,
            }
        })
        .collect()
}

/// Build the flat torrent list for a decoded feed payload
///
/// The feed sends an object keyed by release id, or `[]` when a search has no
/// hits. Entries that don't look like a release are logged and skipped.
///
/// Batch entries are dropped even when the caller asked for a batch: the feed
/// lists them per season with no per-episode structure we can filter on.
pub fn build_result_set(payload: &Value, now: DateTime<Utc>) -> Result<Vec<AnimeTorrent>> {
    let entries: Box<dyn Iterator<Item = (&str, &Value)> + '_> = match payload {
        Value::Object(map) => Box::new(map.iter().map(|(k, v)| (k.as_str(), v))),
        Value::Array(items) => Box::new(items.iter().map(|v| ("", v))),
        other => {
            return Err(ProviderError::InvalidPayload(format!(
                "expected an object of releases, got {}",
                json_kind(other)
            )))
        }
    };

    let mut torrents = Vec::new();

    for (key, value) in entries {
        let release: RawRelease = match RawRelease::deserialize(value) {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed release {:?}: {}", key, e);
                continue;
            }
        };

        if release.is_batch() {
            debug!("Skipping batch release: {}", release.show);
            continue;
        }

        torrents.extend(normalize_release(&release, now));
    }

    Ok(torrents)
}

fn release_title(
    release: &RawRelease,
    episode_number: Option<u32>,
    resolution: &str,
    info_hash: Option<&str>,
) -> String {
    let episode = match episode_number {
        Some(n) => format!("{:02}", n),
        None => release.episode.clone(),
    };

    format!(
        "[{}] {} - {} ({}) [{}].mkv",
        RELEASE_GROUP,
        release.show,
        episode,
        resolution,
        info_hash.unwrap_or("")
    )
}

/// The feed has used both RFC 3339 and RFC 2822 dates
fn parse_release_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
