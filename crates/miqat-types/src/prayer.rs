use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The five canonical daily prayers.
///
/// Ordered by their position in the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [Prayer::Fajr, Prayer::Dhuhr, Prayer::Asr, Prayer::Maghrib, Prayer::Isha];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    /// Result key of the iqamah time, e.g. `iqamah_Fajr`.
    pub fn iqamah_key(&self) -> String {
        format!("iqamah_{}", self.as_str())
    }

    /// Default iqamah offset in minutes.
    pub fn default_iqamah_offset(&self) -> i64 {
        match self {
            Prayer::Fajr => 20,
            Prayer::Dhuhr => 15,
            Prayer::Asr => 15,
            Prayer::Maghrib => 10,
            Prayer::Isha => 15,
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical time markers: the five prayers plus secondary markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeMarker {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Sunset,
    Maghrib,
    Isha,
    Imsak,
    Midnight,
}

impl TimeMarker {
    pub const ALL: [TimeMarker; 9] = [
        TimeMarker::Fajr,
        TimeMarker::Sunrise,
        TimeMarker::Dhuhr,
        TimeMarker::Asr,
        TimeMarker::Sunset,
        TimeMarker::Maghrib,
        TimeMarker::Isha,
        TimeMarker::Imsak,
        TimeMarker::Midnight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeMarker::Fajr => "Fajr",
            TimeMarker::Sunrise => "Sunrise",
            TimeMarker::Dhuhr => "Dhuhr",
            TimeMarker::Asr => "Asr",
            TimeMarker::Sunset => "Sunset",
            TimeMarker::Maghrib => "Maghrib",
            TimeMarker::Isha => "Isha",
            TimeMarker::Imsak => "Imsak",
            TimeMarker::Midnight => "Midnight",
        }
    }
}

impl From<Prayer> for TimeMarker {
    fn from(prayer: Prayer) -> Self {
        match prayer {
            Prayer::Fajr => TimeMarker::Fajr,
            Prayer::Dhuhr => TimeMarker::Dhuhr,
            Prayer::Asr => TimeMarker::Asr,
            Prayer::Maghrib => TimeMarker::Maghrib,
            Prayer::Isha => TimeMarker::Isha,
        }
    }
}

impl fmt::Display for TimeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-of-day strings (`HH:MM`, local civil time) keyed by marker name.
///
/// Keys are kept as strings: the standard calculator returns extra markers
/// (e.g. `Firstthird`) that pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPrayerTimes(BTreeMap<String, String>);

impl RawPrayerTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, time: impl Into<String>) {
        self.0.insert(key.into(), time.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn marker(&self, marker: TimeMarker) -> Option<&str> {
        self.get(marker.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawPrayerTimes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Absolute UTC instants keyed by marker name (or `iqamah_<Prayer>`).
pub type InstantMap = BTreeMap<String, DateTime<Utc>>;

/// The upcoming canonical prayer at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPrayer {
    pub prayer: Prayer,
    pub at: DateTime<Utc>,
}

/// Hijri calendar fields exposed alongside prayer times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HijriDate {
    /// `DD-MM-YYYY`.
    pub date: String,
    pub day: String,
    pub month_number: u32,
    pub month_name: String,
    pub year: String,
}

impl HijriDate {
    /// `<day>-<month name>`, e.g. `10-Ramadan`.
    pub fn day_month_readable(&self) -> String {
        format!("{}-{}", self.day, self.month_name)
    }

    /// `<day>-<month name>-<year>`, e.g. `10-Ramadan-1444`.
    pub fn date_readable(&self) -> String {
        format!("{}-{}-{}", self.day, self.month_name, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iqamah_keys_and_defaults() {
        assert_eq!(Prayer::Maghrib.iqamah_key(), "iqamah_Maghrib");
        let total: i64 = Prayer::ALL.iter().map(Prayer::default_iqamah_offset).sum();
        assert_eq!(total, 75);
    }

    #[test]
    fn test_raw_times_lookup() {
        let raw: RawPrayerTimes = [("Fajr", "05:00"), ("Firstthird", "22:10")].into_iter().collect();
        assert_eq!(raw.marker(TimeMarker::Fajr), Some("05:00"));
        assert_eq!(raw.get("Firstthird"), Some("22:10"));
        assert_eq!(raw.marker(TimeMarker::Isha), None);
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_hijri_readable_forms() {
        let hijri = HijriDate {
            date: "10-09-1444".into(),
            day: "10".into(),
            month_number: 9,
            month_name: "Ramadan".into(),
            year: "1444".into(),
        };
        assert_eq!(hijri.day_month_readable(), "10-Ramadan");
        assert_eq!(hijri.date_readable(), "10-Ramadan-1444");
    }
}
