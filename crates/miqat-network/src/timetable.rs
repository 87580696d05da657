//! Regional published timetable (`ie-icci`).

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use miqat_types::{MiqatError, RawPrayerTimes};
use serde_json::Value;

use crate::alternate::PublishedTimes;
use crate::http::HttpFetch;

pub const DEFAULT_URL: &str = "https://islamireland.ie/api/timetable/";

const SOURCE_NAME: &str = "ie-icci";

/// Timetable indexed by `[month][day]`, each day holding six `[hour, minute]`
/// pairs: Fajr, Sunrise, Dhuhr, Asr, Maghrib, Isha.
pub struct RegionalTimetable {
    http: Arc<dyn HttpFetch>,
    url: String,
}

impl RegionalTimetable {
    pub fn new(http: Arc<dyn HttpFetch>, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    /// Today's times corrected against the standard `reference`.
    ///
    /// # Errors
    /// `SourceUnavailable` or `Parse`; the caller falls back to the
    /// reference times.
    pub async fn fetch(&self, today: NaiveDate, reference: &RawPrayerTimes) -> Result<RawPrayerTimes, MiqatError> {
        let body = self.http.get_json(&self.url).await?;
        let published = parse_day(&body, today)?;
        tracing::debug!(?published, "Timetable entry for today");
        Ok(published.into_raw(reference))
    }
}

fn parse_day(body: &Value, today: NaiveDate) -> Result<PublishedTimes, MiqatError> {
    let month = today.month().to_string();
    let day = today.day().to_string();

    let entry = body
        .get("timetable")
        .and_then(|t| t.get(&month))
        .and_then(|m| m.get(&day))
        .ok_or_else(|| MiqatError::parse(SOURCE_NAME, format!("no entry for month {} day {}", month, day)))?;

    let pairs: Vec<[u32; 2]> =
        serde_json::from_value(entry.clone()).map_err(|e| MiqatError::parse(SOURCE_NAME, e.to_string()))?;
    let [fajr, sunrise, dhuhr, asr, maghrib, isha] = match pairs.as_slice() {
        [a, b, c, d, e, f, ..] => [*a, *b, *c, *d, *e, *f],
        _ => {
            return Err(MiqatError::parse(
                SOURCE_NAME,
                format!("expected 6 prayer entries, found {}", pairs.len()),
            ));
        }
    };

    let pair = |[h, m]: [u32; 2]| (h, m);
    Ok(PublishedTimes {
        fajr: pair(fajr),
        sunrise: pair(sunrise),
        dhuhr: pair(dhuhr),
        asr: pair(asr),
        maghrib: pair(maghrib),
        isha: pair(isha),
    })
}
