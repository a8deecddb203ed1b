//! Link data rate parsing.
//!
//! Rates are written the way simulators take them, e.g. "10Mbps", "1 Gbps",
//! "500kbps" or a raw bits-per-second count.

use regex::Regex;
use std::sync::LazyLock;

static DATA_RATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(?i:([kmg]?)(bps|bit/s|b/s)?)$").expect("Invalid data rate regex")
});

/// Parse a data rate string into bits per second
///
/// Unit prefixes are decimal (`k` = 1000) and case-insensitive.
///
/// # Examples
/// ```
/// use fattree::utils::data_rate::parse_data_rate;
///
/// assert_eq!(parse_data_rate("10Mbps"), Ok(10_000_000));
/// assert_eq!(parse_data_rate("1 Gbps"), Ok(1_000_000_000));
/// assert_eq!(parse_data_rate("64000"), Ok(64_000));
/// assert!(parse_data_rate("fast").is_err());
/// ```
pub fn parse_data_rate(rate: &str) -> Result<u64, String> {
    let rate = rate.trim();
    let caps = DATA_RATE
        .captures(rate)
        .ok_or_else(|| format!("Invalid data rate format: {}", rate))?;

    let value: u64 = caps[1]
        .parse()
        .map_err(|_| format!("Data rate value out of range: {}", rate))?;

    let multiplier: u64 = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
        Some("k") => 1_000,
        Some("m") => 1_000_000,
        Some("g") => 1_000_000_000,
        _ => 1,
    };

    // A bare unit prefix without "bps" is ambiguous.
    if multiplier != 1 && caps.get(3).is_none() {
        return Err(format!("Data rate '{}' is missing its unit", rate));
    }

    value
        .checked_mul(multiplier)
        .filter(|bits| *bits > 0)
        .ok_or_else(|| format!("Data rate must be a positive 64-bit value: {}", rate))
}
