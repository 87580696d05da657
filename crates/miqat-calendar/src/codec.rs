//! `HH:MM` time-of-day codec.

use miqat_types::MiqatError;

/// Parses `HH:MM` into `(hour, minute)`.
///
/// Only the shape is checked: two `:`-separated unsigned integers. Range
/// checks happen when the pair is combined with a date.
///
/// # Errors
/// Returns `Format` for anything else.
pub fn parse(s: &str) -> Result<(u32, u32), MiqatError> {
    let mut parts = s.split(':');
    let (Some(h), Some(m), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(MiqatError::format(s));
    };
    let hour = h.trim().parse::<u32>().map_err(|_| MiqatError::format(s))?;
    let minute = m.trim().parse::<u32>().map_err(|_| MiqatError::format(s))?;
    Ok((hour, minute))
}

/// Formats `(hour + offset) mod 24` and `minute` as zero-padded `HH:MM`.
///
/// Negative offsets wrap: `format(0, 30, -1)` is `"23:30"`.
pub fn format(hour: u32, minute: u32, offset: i32) -> String {
    let hour = (i64::from(hour) + i64::from(offset)).rem_euclid(24);
    format!("{:02}:{:02}", hour, minute)
}

/// First five characters of a time string, e.g. `"05:12:00"` → `"05:12"`,
/// `"05:12 (IST)"` → `"05:12"`. Shorter input is returned unchanged.
pub fn truncate(s: &str) -> &str {
    s.get(..5).unwrap_or(s)
}
