//! Configuration validation utilities.
//!
//! Consistency checks that need topology arithmetic and therefore live
//! outside the plain serde structures.

use crate::ip::allocator::{AGGR_EDGE_OFFSET, EDGE_HOST_OFFSET};
use crate::ip::LoopbackPrefixes;
use crate::topology::TopologyCounts;

/// Log levels accepted by `general.log_level`
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Check a log level name against [`LOG_LEVELS`], case-insensitively.
pub fn validate_log_level(level: &str) -> Result<(), String> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(format!(
            "Unknown log level '{}', expected one of {}",
            level,
            LOG_LEVELS.join(", ")
        ))
    }
}

/// Make sure loopback ranges stay clear of link subnets and of each other.
///
/// Link subnets occupy first octets `1..=core switches`, `101..=100+pods`
/// and `201..=200+pods`; the latter range is also routed as the per-pod
/// host aggregates, so a loopback in there would be unreachable.
///
/// # Examples
/// ```
/// use fattree::ip::LoopbackPrefixes;
/// use fattree::topology::TopologyCounts;
/// use fattree::utils::validation::validate_loopback_prefixes;
///
/// let counts = TopologyCounts::derive(4).unwrap();
/// assert!(validate_loopback_prefixes(&counts, &LoopbackPrefixes::default()).is_ok());
///
/// let clash = LoopbackPrefixes { core_prefix: [3, 0, 0], aggr_prefix: [250, 255] };
/// assert!(validate_loopback_prefixes(&counts, &clash).is_err());
/// ```
pub fn validate_loopback_prefixes(
    counts: &TopologyCounts,
    loopback: &LoopbackPrefixes,
) -> Result<(), String> {
    let link_ranges = [
        ("core-aggregation", 1, counts.core_switches),
        ("aggregation-edge", AGGR_EDGE_OFFSET + 1, AGGR_EDGE_OFFSET + counts.pods),
        ("edge-host", EDGE_HOST_OFFSET + 1, EDGE_HOST_OFFSET + counts.pods),
    ];

    for (name, first) in [
        ("core", loopback.core_prefix[0]),
        ("aggregation", loopback.aggr_prefix[0]),
    ] {
        let first = first as usize;
        if first == 0 {
            return Err(format!("{} loopback prefix cannot start with 0", name));
        }
        for (range, lo, hi) in link_ranges {
            if (lo..=hi).contains(&first) {
                return Err(format!(
                    "{} loopback prefix {} overlaps {} link subnets ({}..={})",
                    name, first, range, lo, hi
                ));
            }
        }
    }

    let [c0, c1, c2] = loopback.core_prefix;
    if [c0, c1] == loopback.aggr_prefix && (1..=counts.pods).contains(&(c2 as usize)) {
        return Err(format!(
            "core loopback prefix {}.{}.{} overlaps aggregation loopbacks of pod {}",
            c0,
            c1,
            c2,
            c2 as usize - 1
        ));
    }

    Ok(())
}
