//! Utility functions

const MB: f64 = 1024.0 * 1024.0;

/// Format a byte size as the megabyte label shown to the host
///
/// A size of zero means the feed did not declare one.
pub fn format_size_label(size: u64) -> String {
    if size > 0 {
        format!("{:.2} MB", size as f64 / MB)
    } else {
        "N/A".to_string()
    }
}

/// Parse the leading run of ASCII digits in `s`
///
/// Returns `None` when `s` does not start with a digit or the value overflows.
pub fn parse_leading_u32(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    s[..end].parse().ok()
}
