//! Magnet URI field extraction
//!
//! Only the info-hash and the declared length are pulled out. Anything else in
//! the URI is left to the torrent client.

use regex::Regex;
use std::sync::LazyLock;

static INFO_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"btih:([A-Za-z0-9]+)").expect("valid info-hash pattern"));

static EXACT_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"xl=(\d+)").expect("valid length pattern"));

/// Fields derived from a magnet URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagnetInfo {
    /// Uppercase info-hash, `None` when the URI carries none
    pub info_hash: Option<String>,
    /// Declared size in bytes, 0 when absent
    pub size: u64,
}

/// Extract the info-hash and declared size from a magnet URI
///
/// Missing or malformed tokens are not errors; they fall back to `None` / 0.
pub fn parse_magnet(magnet: &str) -> MagnetInfo {
    let info_hash = INFO_HASH
        .captures(magnet)
        .map(|c| c[1].to_uppercase());

    let size = EXACT_LENGTH
        .captures(magnet)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0);

    MagnetInfo { info_hash, size }
}
