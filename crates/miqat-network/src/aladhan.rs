//! Standard calculation through the Aladhan timings API.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use miqat_calendar::{codec, hijri};
use miqat_types::{CalculationMethod, HijriDate, Location, MiqatError, RawPrayerTimes};
use serde::Deserialize;

use crate::http::HttpFetch;

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com";

/// Output of one standard calculation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardTimings {
    pub times: RawPrayerTimes,
    /// Hijri block embedded in the response, if it was present and valid.
    pub hijri: Option<HijriDate>,
}

/// Capability to compute prayer times for a location, method and date.
#[async_trait]
pub trait PrayerTimeSource: Send + Sync {
    /// # Errors
    /// `SourceUnavailable` when the calculator cannot be reached, `Parse`
    /// when its answer is malformed.
    async fn fetch(
        &self,
        location: Location,
        method: CalculationMethod,
        date: NaiveDate,
    ) -> Result<StandardTimings, MiqatError>;
}

#[derive(Debug, Deserialize)]
struct AladhanResponse {
    code: Option<u16>,
    status: Option<String>,
    data: Option<AladhanData>,
}

#[derive(Debug, Deserialize)]
struct AladhanData {
    timings: BTreeMap<String, String>,
    date: Option<AladhanDate>,
}

#[derive(Debug, Deserialize)]
struct AladhanDate {
    hijri: Option<AladhanHijri>,
}

#[derive(Debug, Deserialize)]
struct AladhanHijri {
    date: Option<String>,
    day: String,
    month: AladhanMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct AladhanMonth {
    number: u32,
    en: String,
}

/// Aladhan calculator client.
pub struct AladhanSource {
    http: Arc<dyn HttpFetch>,
    base_url: String,
}

impl AladhanSource {
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: Arc<dyn HttpFetch>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, location: Location, method: CalculationMethod, date: NaiveDate) -> String {
        // Alternate-source methods are never sent to the calculator.
        let method = method.standard_method();
        let id = method.aladhan_id().unwrap_or_default();
        format!(
            "{}/v1/timings/{}?latitude={}&longitude={}&method={}",
            self.base_url,
            date.format("%d-%m-%Y"),
            location.latitude,
            location.longitude,
            id
        )
    }
}

#[async_trait]
impl PrayerTimeSource for AladhanSource {
    async fn fetch(
        &self,
        location: Location,
        method: CalculationMethod,
        date: NaiveDate,
    ) -> Result<StandardTimings, MiqatError> {
        let url = self.url(location, method, date);
        tracing::debug!(%url, %method, "Fetching standard prayer times");
        let body = self.http.get_json(&url).await?;
        parse_response(body)
    }
}

fn parse_response(body: serde_json::Value) -> Result<StandardTimings, MiqatError> {
    let response: AladhanResponse =
        serde_json::from_value(body).map_err(|e| MiqatError::parse("calculator response", e.to_string()))?;

    if let Some(code) = response.code.filter(|c| *c != 200) {
        return Err(MiqatError::parse(
            "calculator response",
            format!("code {} ({})", code, response.status.unwrap_or_default()),
        ));
    }
    let data = response
        .data
        .ok_or_else(|| MiqatError::parse("calculator response", "missing data"))?;

    // Timings may carry a zone suffix such as "05:12 (IST)".
    let times: RawPrayerTimes = data
        .timings
        .iter()
        .map(|(k, v)| (k.as_str(), codec::truncate(v.trim())))
        .collect();
    if times.is_empty() {
        return Err(MiqatError::parse("calculator response", "no timings"));
    }

    let hijri = data.date.and_then(|d| d.hijri).map(|h| {
        hijri::compose(&h.day, h.month.number, &h.month.en, &h.year, h.date.as_deref())
    });

    Ok(StandardTimings { times, hijri })
}
