//! The published result of one resolution cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::method::CalculationMethod;
use crate::prayer::{HijriDate, InstantMap, NextPrayer, Prayer, TimeMarker};

pub const KEY_NEXT_PRAYER: &str = "next_prayer";
pub const KEY_NEXT_PRAYER_NAME: &str = "next_prayer_name";
pub const KEY_HIJRI_DATE: &str = "hijri_date";
pub const KEY_HIJRI_DAY: &str = "hijri_day";
pub const KEY_HIJRI_MONTH_NUM: &str = "hijri_month_num";
pub const KEY_HIJRI_MONTH_READABLE: &str = "hijri_month_readable";
pub const KEY_HIJRI_YEAR: &str = "hijri_year";
pub const KEY_HIJRI_DATE_READABLE: &str = "hijri_date_readable";
pub const KEY_HIJRI_DAY_MONTH_READABLE: &str = "hijri_day_month_readable";

/// A single value in the exposed result mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Timestamp(DateTime<Utc>),
    Number(u32),
    Text(String),
}

/// Immutable result of one resolution cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerSnapshot {
    pub method: CalculationMethod,
    pub resolved_at: DateTime<Utc>,
    pub prayer_times: InstantMap,
    pub iqamah_times: InstantMap,
    pub hijri: Option<HijriDate>,
    pub next_prayer: Option<NextPrayer>,
}

impl PrayerSnapshot {
    /// Resolved instant of a marker, if this cycle produced one.
    pub fn time_of(&self, marker: TimeMarker) -> Option<DateTime<Utc>> {
        self.prayer_times.get(marker.as_str()).copied()
    }

    pub fn iqamah_of(&self, prayer: Prayer) -> Option<DateTime<Utc>> {
        self.iqamah_times.get(&prayer.iqamah_key()).copied()
    }

    /// Looks up one key of the exposed mapping.
    pub fn get(&self, key: &str) -> Option<SensorValue> {
        if let Some(at) = self.prayer_times.get(key).or_else(|| self.iqamah_times.get(key)) {
            return Some(SensorValue::Timestamp(*at));
        }
        match key {
            KEY_NEXT_PRAYER => self.next_prayer.map(|n| SensorValue::Timestamp(n.at)),
            KEY_NEXT_PRAYER_NAME => self.next_prayer.map(|n| SensorValue::Text(n.prayer.to_string())),
            _ => self.hijri.as_ref().and_then(|h| hijri_value(h, key)),
        }
    }

    /// The full keyed union: prayer times, iqamah times, Hijri fields and
    /// the next prayer.
    pub fn to_values(&self) -> BTreeMap<String, SensorValue> {
        let mut values: BTreeMap<String, SensorValue> = self
            .prayer_times
            .iter()
            .chain(self.iqamah_times.iter())
            .map(|(k, at)| (k.clone(), SensorValue::Timestamp(*at)))
            .collect();

        if let Some(hijri) = &self.hijri {
            for key in HIJRI_KEYS {
                if let Some(value) = hijri_value(hijri, key) {
                    values.insert(key.to_string(), value);
                }
            }
        }
        if let Some(next) = self.next_prayer {
            values.insert(KEY_NEXT_PRAYER.to_string(), SensorValue::Timestamp(next.at));
            values.insert(KEY_NEXT_PRAYER_NAME.to_string(), SensorValue::Text(next.prayer.to_string()));
        }
        values
    }
}

const HIJRI_KEYS: [&str; 7] = [
    KEY_HIJRI_DATE,
    KEY_HIJRI_DAY,
    KEY_HIJRI_MONTH_NUM,
    KEY_HIJRI_MONTH_READABLE,
    KEY_HIJRI_YEAR,
    KEY_HIJRI_DATE_READABLE,
    KEY_HIJRI_DAY_MONTH_READABLE,
];

fn hijri_value(hijri: &HijriDate, key: &str) -> Option<SensorValue> {
    let value = match key {
        KEY_HIJRI_DATE => SensorValue::Text(hijri.date.clone()),
        KEY_HIJRI_DAY => SensorValue::Text(hijri.day.clone()),
        KEY_HIJRI_MONTH_NUM => SensorValue::Number(hijri.month_number),
        KEY_HIJRI_MONTH_READABLE => SensorValue::Text(hijri.month_name.clone()),
        KEY_HIJRI_YEAR => SensorValue::Text(hijri.year.clone()),
        KEY_HIJRI_DATE_READABLE => SensorValue::Text(hijri.date_readable()),
        KEY_HIJRI_DAY_MONTH_READABLE => SensorValue::Text(hijri.day_month_readable()),
        _ => return None,
    };
    Some(value)
}

/// Display metadata for one exposed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
}

/// Keys a host is expected to present, with their display names.
pub const SENSOR_DESCRIPTIONS: &[SensorDescription] = &[
    SensorDescription { key: "Fajr", name: "Fajr prayer" },
    SensorDescription { key: "Sunrise", name: "Sunrise time" },
    SensorDescription { key: "Dhuhr", name: "Dhuhr prayer" },
    SensorDescription { key: "Asr", name: "Asr prayer" },
    SensorDescription { key: "Maghrib", name: "Maghrib prayer" },
    SensorDescription { key: "Isha", name: "Isha prayer" },
    SensorDescription { key: "Midnight", name: "Midnight time" },
    SensorDescription { key: "iqamah_Fajr", name: "Fajr iqamah" },
    SensorDescription { key: "iqamah_Dhuhr", name: "Dhuhr iqamah" },
    SensorDescription { key: "iqamah_Asr", name: "Asr iqamah" },
    SensorDescription { key: "iqamah_Maghrib", name: "Maghrib iqamah" },
    SensorDescription { key: "iqamah_Isha", name: "Isha iqamah" },
    SensorDescription { key: KEY_NEXT_PRAYER, name: "Next prayer" },
    SensorDescription { key: KEY_NEXT_PRAYER_NAME, name: "Next prayer name" },
    SensorDescription { key: KEY_HIJRI_DATE, name: "Hijri Date" },
    SensorDescription { key: KEY_HIJRI_DAY, name: "Hijri Day" },
    SensorDescription { key: KEY_HIJRI_MONTH_NUM, name: "Hijri Month Number" },
    SensorDescription { key: KEY_HIJRI_MONTH_READABLE, name: "Hijri Month" },
    SensorDescription { key: KEY_HIJRI_YEAR, name: "Hijri Year" },
    SensorDescription { key: KEY_HIJRI_DATE_READABLE, name: "Hijri Date Readable" },
    SensorDescription { key: KEY_HIJRI_DAY_MONTH_READABLE, name: "Hijri Day and Month" },
];
