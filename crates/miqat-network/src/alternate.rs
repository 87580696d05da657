//! Shared assembly for alternate (non-calculated) timetables.

use miqat_calendar::{codec, offset};
use miqat_types::{RawPrayerTimes, TimeMarker};

/// Six `(hour, minute)` readings published by an alternate source, in
/// local time as the source sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedTimes {
    pub fajr: (u32, u32),
    pub sunrise: (u32, u32),
    pub dhuhr: (u32, u32),
    pub asr: (u32, u32),
    pub maghrib: (u32, u32),
    pub isha: (u32, u32),
}

impl PublishedTimes {
    /// Hour correction against the standard Maghrib of the same day.
    pub fn hour_offset(&self, reference: &RawPrayerTimes) -> i32 {
        let (h, m) = self.maghrib;
        let standard_maghrib = reference.marker(TimeMarker::Maghrib).unwrap_or_default();
        offset::correct(&codec::format(h, m, 0), standard_maghrib)
    }

    /// Builds the canonical mapping, shifting every reading by the hour
    /// correction. Sunset and Imsak repeat Maghrib; Midnight comes from the
    /// standard calculation.
    pub fn into_raw(self, reference: &RawPrayerTimes) -> RawPrayerTimes {
        let hr_offset = self.hour_offset(reference);
        if hr_offset != 0 {
            tracing::info!(hr_offset, "Applying hour correction to published timetable");
        }
        let shift = |(h, m): (u32, u32)| codec::format(h, m, hr_offset);
        let maghrib = shift(self.maghrib);
        let midnight = reference.marker(TimeMarker::Midnight).unwrap_or("00:00");

        let mut raw = RawPrayerTimes::new();
        raw.insert(TimeMarker::Fajr.as_str(), shift(self.fajr));
        raw.insert(TimeMarker::Sunrise.as_str(), shift(self.sunrise));
        raw.insert(TimeMarker::Dhuhr.as_str(), shift(self.dhuhr));
        raw.insert(TimeMarker::Asr.as_str(), shift(self.asr));
        raw.insert(TimeMarker::Sunset.as_str(), maghrib.clone());
        raw.insert(TimeMarker::Maghrib.as_str(), maghrib.clone());
        raw.insert(TimeMarker::Isha.as_str(), shift(self.isha));
        raw.insert(TimeMarker::Imsak.as_str(), maghrib);
        raw.insert(TimeMarker::Midnight.as_str(), midnight);
        raw
    }
}
