//! Mosque sites running the WordPress "Daily Prayer Time" plugin.

use std::sync::Arc;

use miqat_calendar::codec;
use miqat_types::{MiqatError, RawPrayerTimes};
use serde_json::Value;

use crate::alternate::PublishedTimes;
use crate::http::HttpFetch;

/// `{site}` is replaced with the method suffix, e.g. `mcnd` for `ie-mcnd`.
pub const DEFAULT_URL_TEMPLATE: &str = "https://{site}.ie/wp-json/dpt/v1/prayertime?filter=today";

pub struct WordPressPlugin {
    http: Arc<dyn HttpFetch>,
    url_template: String,
}

impl WordPressPlugin {
    pub fn new(http: Arc<dyn HttpFetch>, url_template: impl Into<String>) -> Self {
        Self {
            http,
            url_template: url_template.into(),
        }
    }

    pub fn url(&self, site: &str) -> String {
        self.url_template.replace("{site}", site)
    }

    /// Today's times for `site`, corrected against the standard `reference`.
    ///
    /// # Errors
    /// `SourceUnavailable` or `Parse`; the caller falls back to the
    /// reference times.
    pub async fn fetch(&self, site: &str, reference: &RawPrayerTimes) -> Result<RawPrayerTimes, MiqatError> {
        let body = self.http.get_json(&self.url(site)).await?;
        let published = parse_today(&body, site)?;
        Ok(published.into_raw(reference))
    }
}

fn parse_today(body: &Value, site: &str) -> Result<PublishedTimes, MiqatError> {
    let today = body
        .as_array()
        .and_then(|a| a.first())
        .ok_or_else(|| MiqatError::parse(site, "expected a single-element array"))?;

    let field = |name: &str| -> Result<(u32, u32), MiqatError> {
        let raw = today
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| MiqatError::parse(site, format!("missing field {}", name)))?;
        codec::parse(codec::truncate(raw))
    };

    Ok(PublishedTimes {
        fajr: field("fajr_begins")?,
        sunrise: field("sunrise")?,
        dhuhr: field("zuhr_begins")?,
        asr: field("asr_mithl_1")?,
        maghrib: field("maghrib_begins")?,
        isha: field("isha_begins")?,
    })
}
