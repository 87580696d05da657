//! Whole-hour correction for sources that lag a DST change.

use chrono::NaiveTime;

/// Differences up to this many seconds are normal method variance.
pub const TOLERANCE_SECS: i64 = 900;

/// Compares a non-standard Maghrib with the standard one and returns the
/// hour offset to apply to the non-standard source: `-1` when it is more
/// than 15 minutes later, `+1` when more than 15 minutes earlier, else `0`.
///
/// Unparsable input yields `0`.
pub fn correct(nonstandard: &str, standard: &str) -> i32 {
    let (ns, st) = match (
        NaiveTime::parse_from_str(nonstandard, "%H:%M"),
        NaiveTime::parse_from_str(standard, "%H:%M"),
    ) {
        (Ok(ns), Ok(st)) => (ns, st),
        (Err(e), _) | (_, Err(e)) => {
            tracing::info!(nonstandard, standard, error = %e, "Failed to parse time expecting HH:MM format");
            return 0;
        }
    };

    let delta = (ns - st).num_seconds();
    if delta.abs() <= TOLERANCE_SECS {
        0
    } else if delta > 0 {
        -1
    } else {
        1
    }
}
