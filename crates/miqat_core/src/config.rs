//! Companion configuration snapshot.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono_tz::Tz;
use miqat_calendar::local;
use miqat_network::{aladhan, http, timetable, wordpress};
use miqat_types::{CalculationMethod, IqamahMethod, Location, MiqatError, Prayer};
use serde::{Deserialize, Serialize};

/// An iqamah offset as written by the user: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OffsetSetting {
    Minutes(i64),
    Text(String),
}

impl OffsetSetting {
    fn minutes(&self) -> Option<i64> {
        match self {
            OffsetSetting::Minutes(m) => Some(*m),
            OffsetSetting::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for OffsetSetting {
    fn from(minutes: i64) -> Self {
        Self::Minutes(minutes)
    }
}

/// Source endpoints; overridable for mirrors and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub aladhan_base_url: String,
    pub regional_timetable_url: String,
    /// Must contain `{site}`.
    pub wordpress_url_template: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            aladhan_base_url: aladhan::DEFAULT_BASE_URL.to_string(),
            regional_timetable_url: timetable::DEFAULT_URL.to_string(),
            wordpress_url_template: wordpress::DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

/// Options for one companion instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone name. The system zone is used when absent.
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub calculation_method: CalculationMethod,
    #[serde(default)]
    pub iqamah_method: IqamahMethod,
    #[serde(default = "default_iqamah_offsets")]
    pub iqamah_offsets: BTreeMap<String, OffsetSetting>,
    #[serde(default)]
    pub custom_iqamah_api: Option<String>,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// Largest iqamah offset accepted, in minutes either side of the prayer.
pub const MAX_IQAMAH_OFFSET_MINUTES: i64 = 24 * 60;

fn default_iqamah_offsets() -> BTreeMap<String, OffsetSetting> {
    Prayer::ALL
        .into_iter()
        .map(|p| (p.as_str().to_string(), OffsetSetting::Minutes(p.default_iqamah_offset())))
        .collect()
}

fn default_http_timeout_secs() -> u64 {
    http::DEFAULT_TIMEOUT_SECS
}

impl CompanionConfig {
    pub fn new(location: Location) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            time_zone: None,
            calculation_method: CalculationMethod::default(),
            iqamah_method: IqamahMethod::default(),
            iqamah_offsets: default_iqamah_offsets(),
            custom_iqamah_api: None,
            endpoints: Endpoints::default(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }

    pub fn time_zone_name(mut self, name: impl Into<String>) -> Self {
        self.time_zone = Some(name.into());
        self
    }

    pub fn calculation_method(mut self, method: CalculationMethod) -> Self {
        self.calculation_method = method;
        self
    }

    pub fn iqamah_method(mut self, method: IqamahMethod) -> Self {
        self.iqamah_method = method;
        self
    }

    pub fn iqamah_offset(mut self, prayer: Prayer, setting: impl Into<OffsetSetting>) -> Self {
        self.iqamah_offsets.insert(prayer.as_str().to_string(), setting.into());
        self
    }

    pub fn custom_iqamah_api(mut self, url: impl Into<String>) -> Self {
        self.custom_iqamah_api = Some(url.into());
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Loads a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self, MiqatError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MiqatError::invalid_config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, MiqatError> {
        serde_json::from_str(text).map_err(|e| MiqatError::invalid_config(e.to_string()))
    }

    pub fn location(&self) -> Result<Location, MiqatError> {
        Location::new(self.latitude, self.longitude)
    }

    pub fn tz(&self) -> Result<Tz, MiqatError> {
        match &self.time_zone {
            Some(name) => local::parse_timezone(name),
            None => Ok(local::system_timezone()),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Offsets per prayer, defaults filled in for prayers not listed.
    ///
    /// # Errors
    /// `Configuration` for an unknown prayer name, a non-numeric value or an
    /// offset beyond a day.
    pub fn resolved_iqamah_offsets(&self) -> Result<BTreeMap<Prayer, i64>, MiqatError> {
        let mut offsets: BTreeMap<Prayer, i64> =
            Prayer::ALL.into_iter().map(|p| (p, p.default_iqamah_offset())).collect();

        for (name, setting) in &self.iqamah_offsets {
            let prayer = Prayer::ALL
                .into_iter()
                .find(|p| p.as_str().eq_ignore_ascii_case(name))
                .ok_or_else(|| MiqatError::invalid_config(format!("Unknown prayer '{}' in iqamah_offsets", name)))?;
            let minutes = setting.minutes().ok_or_else(|| {
                MiqatError::invalid_config(format!("Iqamah offset for {} is not a number: {:?}", name, setting))
            })?;
            if !(-MAX_IQAMAH_OFFSET_MINUTES..=MAX_IQAMAH_OFFSET_MINUTES).contains(&minutes) {
                return Err(MiqatError::invalid_config(format!(
                    "Iqamah offset for {} is out of range: {} minutes",
                    name, minutes
                )));
            }
            offsets.insert(prayer, minutes);
        }
        Ok(offsets)
    }

    /// The custom iqamah endpoint, if configured and plausible.
    pub fn iqamah_api_url(&self) -> Result<&str, MiqatError> {
        let url = self
            .custom_iqamah_api
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| MiqatError::invalid_config("custom_iqamah_api is not set"))?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(MiqatError::invalid_config(format!("custom_iqamah_api '{}' is not an http(s) URL", url)));
        }
        Ok(url)
    }

    /// Checks everything a companion cannot run without.
    pub fn validate(&self) -> Result<(), MiqatError> {
        self.location()?;
        self.tz()?;
        if self.http_timeout_secs == 0 {
            return Err(MiqatError::invalid_config("http_timeout_secs must be positive"));
        }
        if !self.endpoints.wordpress_url_template.contains("{site}") {
            return Err(MiqatError::invalid_config("wordpress_url_template must contain {site}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dublin() -> CompanionConfig {
        CompanionConfig::new(Location::new_unchecked(53.35, -6.26)).time_zone_name("Europe/Dublin")
    }

    #[test]
    fn test_minimal_json_gets_defaults() {
        let config = CompanionConfig::from_json(r#"{"latitude": 53.35, "longitude": -6.26}"#).unwrap();
        assert_eq!(config.calculation_method, CalculationMethod::IeIcci);
        assert_eq!(config.iqamah_method, IqamahMethod::Offset);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.endpoints, Endpoints::default());
        let offsets = config.resolved_iqamah_offsets().unwrap();
        assert_eq!(offsets[&Prayer::Fajr], 20);
        assert_eq!(offsets[&Prayer::Maghrib], 10);
    }

    #[test]
    fn test_full_json() {
        let config = CompanionConfig::from_json(
            r#"{
                "latitude": 21.42, "longitude": 39.83, "time_zone": "Asia/Riyadh",
                "calculation_method": "makkah", "iqamah_method": "api",
                "iqamah_offsets": {"Fajr": "25", "isha": 0},
                "custom_iqamah_api": "https://example.org/iqamah.json"
            }"#,
        )
        .unwrap();
        assert_eq!(config.calculation_method, CalculationMethod::Makkah);
        assert_eq!(config.iqamah_api_url().unwrap(), "https://example.org/iqamah.json");
        let offsets = config.resolved_iqamah_offsets().unwrap();
        assert_eq!(offsets[&Prayer::Fajr], 25);
        assert_eq!(offsets[&Prayer::Isha], 0);
        assert_eq!(offsets[&Prayer::Dhuhr], 15);
        config.validate().unwrap();
    }

    #[test]
    fn test_bad_offsets() {
        let config = dublin().iqamah_offset(Prayer::Asr, OffsetSetting::Text("soon".into()));
        assert!(matches!(config.resolved_iqamah_offsets(), Err(MiqatError::Configuration { .. })));

        let mut config = dublin();
        config.iqamah_offsets.insert("Tahajjud".into(), OffsetSetting::Minutes(5));
        assert!(config.resolved_iqamah_offsets().is_err());
    }

    #[test]
    fn test_offsets_bounded_to_a_day() {
        let config = dublin().iqamah_offset(Prayer::Isha, 1440_i64).iqamah_offset(Prayer::Fajr, -1440_i64);
        let offsets = config.resolved_iqamah_offsets().unwrap();
        assert_eq!(offsets[&Prayer::Isha], 1440);
        assert_eq!(offsets[&Prayer::Fajr], -1440);

        let config = dublin().iqamah_offset(Prayer::Isha, 1441_i64);
        assert!(matches!(config.resolved_iqamah_offsets(), Err(MiqatError::Configuration { .. })));

        let config = CompanionConfig::from_json(
            r#"{"latitude": 53.35, "longitude": -6.26, "iqamah_offsets": {"Fajr": 10000000000000}}"#,
        )
        .unwrap();
        assert!(config.resolved_iqamah_offsets().is_err());
        let config = dublin().iqamah_offset(Prayer::Asr, OffsetSetting::Text("-9223372036854775808".into()));
        assert!(config.resolved_iqamah_offsets().is_err());
    }

    #[test]
    fn test_iqamah_api_url_checks() {
        assert!(dublin().iqamah_api_url().is_err());
        assert!(dublin().custom_iqamah_api("ftp://x").iqamah_api_url().is_err());
        assert!(dublin().custom_iqamah_api("  ").iqamah_api_url().is_err());
    }

    #[test]
    fn test_validate() {
        dublin().validate().unwrap();
        let mut config = dublin();
        config.latitude = 120.0;
        assert!(config.validate().is_err());
        assert!(dublin().time_zone_name("Nowhere/Special").validate().is_err());
        let mut config = dublin();
        config.endpoints.wordpress_url_template = "https://example.org".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_location_rejected() {
        assert!(CompanionConfig::from_json(r#"{"calculation_method": "isna"}"#).is_err());
    }
}
