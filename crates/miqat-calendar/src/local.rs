//! Local civil time at the configured location.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;
use miqat_types::MiqatError;

use crate::codec;

/// Get the system's configured timezone.
///
/// Falls back to UTC if the system timezone cannot be determined.
pub fn system_timezone() -> Tz {
    get_timezone().ok().and_then(|s| s.parse().ok()).unwrap_or(Tz::UTC)
}

/// Parses an IANA zone name such as `Europe/Dublin`.
pub fn parse_timezone(name: &str) -> Result<Tz, MiqatError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| MiqatError::invalid_config(format!("Unknown time zone '{}'", name)))
}

/// Local calendar date of an instant.
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// Interprets a wall-clock reading in `tz`.
///
/// Ambiguous readings (clocks going back) take the earlier instant. Readings
/// inside a spring-forward gap are moved one hour later.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt.with_timezone(&Utc));
    }
    let shifted = naive + Duration::hours(1);
    tz.from_local_datetime(&shifted)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Combines a local date with an `(hour, minute)` reading.
///
/// # Errors
/// Returns `Parse` when the pair is not a valid time of day.
pub fn combine(date: NaiveDate, hour: u32, minute: u32, tz: Tz) -> Result<DateTime<Utc>, MiqatError> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        MiqatError::parse("time of day", format!("{:02}:{:02} is not a valid time", hour, minute))
    })?;
    localize(date.and_time(time), tz).ok_or_else(|| {
        MiqatError::parse("time of day", format!("{} {} does not exist in {}", date, time, tz))
    })
}

/// Next occurrence of an `HH:MM` reading that is not in the past.
///
/// Uses `today` unless that instant is strictly before `now`, in which case
/// the same reading on the following day is used.
pub fn next_occurrence(today: NaiveDate, hhmm: &str, now: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>, MiqatError> {
    let (hour, minute) = codec::parse(hhmm)?;
    let candidate = combine(today, hour, minute, tz)?;
    if candidate >= now {
        return Ok(candidate);
    }
    let tomorrow = today
        .succ_opt()
        .ok_or_else(|| MiqatError::parse("date", format!("no day after {}", today)))?;
    combine(tomorrow, hour, minute, tz)
}

/// Adds minutes on the local wall clock, e.g. an iqamah offset.
///
/// `None` when the result is not representable.
pub fn add_local_minutes(at: DateTime<Utc>, minutes: i64, tz: Tz) -> Option<DateTime<Utc>> {
    let wall = at
        .with_timezone(&tz)
        .naive_local()
        .checked_add_signed(TimeDelta::try_minutes(minutes)?)?;
    localize(wall, tz)
}

/// First instant of the local day containing `at`.
pub fn start_of_local_day(at: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let midnight = local_date(at, tz).and_time(NaiveTime::MIN);
    // A zone may skip midnight itself; fall back to the UTC reading.
    localize(midnight, tz).unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
