//! One resolution cycle: fetch, reconcile, localise, derive.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use miqat_calendar::{hijri, local};
use miqat_network::{HttpFetch, PrayerTimeSource, RegionalTimetable, StandardTimings, WordPressPlugin};
use miqat_types::{
    CalculationMethod, HijriDate, InstantMap, Location, MiqatError, NextPrayer, Prayer, PrayerSnapshot,
    RawPrayerTimes, SourceKind, TimeMarker,
};

use crate::config::CompanionConfig;
use crate::iqamah::IqamahSettings;

/// Output of a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub snapshot: PrayerSnapshot,
    /// Rollover-adjusted Midnight, used to arm the next refresh.
    pub midnight: Option<DateTime<Utc>>,
}

/// Resolves today's prayer times for one location and method.
pub struct DailyResolver {
    location: Location,
    tz: Tz,
    method: CalculationMethod,
    iqamah: IqamahSettings,
    standard: Arc<dyn PrayerTimeSource>,
    http: Arc<dyn HttpFetch>,
    timetable: RegionalTimetable,
    wordpress: WordPressPlugin,
}

impl DailyResolver {
    /// # Errors
    /// `Configuration` for an invalid location or time zone. Unusable
    /// iqamah settings only disable iqamah times.
    pub fn new(
        config: &CompanionConfig,
        standard: Arc<dyn PrayerTimeSource>,
        http: Arc<dyn HttpFetch>,
    ) -> Result<Self, MiqatError> {
        let location = config.location()?;
        let tz = config.tz()?;
        let iqamah = IqamahSettings::from_config(config);
        if let IqamahSettings::Disabled(reason) = &iqamah {
            tracing::warn!(%reason, "Iqamah settings unusable, iqamah times disabled");
        }

        Ok(Self {
            location,
            tz,
            method: config.calculation_method,
            iqamah,
            timetable: RegionalTimetable::new(http.clone(), config.endpoints.regional_timetable_url.clone()),
            wordpress: WordPressPlugin::new(http.clone(), config.endpoints.wordpress_url_template.clone()),
            standard,
            http,
        })
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }

    /// Runs one cycle as of `now`.
    ///
    /// # Errors
    /// `CalculationFailure` when the standard calculation fails. Every other
    /// failure degrades inside the cycle.
    pub async fn resolve(&self, now: DateTime<Utc>) -> Result<Resolution, MiqatError> {
        let today = local::local_date(now, self.tz);
        tracing::debug!(method = %self.method, %today, "Resolving prayer times");

        let standard = self
            .standard
            .fetch(self.location, self.method.standard_method(), today)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Standard calculation failed");
                MiqatError::CalculationFailure(e.to_string())
            })?;

        let raw = self.variant_times(today, &standard).await;
        let prayer_times = resolve_times(&raw, today, now, self.tz);
        let iqamah_times = self.iqamah.derive(self.http.as_ref(), &prayer_times, today, now, self.tz).await;
        let hijri = hijri_or_tabular(standard.hijri, today);
        let next_prayer = next_prayer(&prayer_times, now);
        let midnight = prayer_times.get(TimeMarker::Midnight.as_str()).copied();

        tracing::info!(
            times = prayer_times.len(),
            iqamah = iqamah_times.len(),
            next = ?next_prayer.map(|n| n.prayer),
            "Prayer times resolved"
        );

        Ok(Resolution {
            snapshot: PrayerSnapshot {
                method: self.method,
                resolved_at: now,
                prayer_times,
                iqamah_times,
                hijri,
                next_prayer,
            },
            midnight,
        })
    }

    async fn variant_times(&self, today: NaiveDate, standard: &StandardTimings) -> RawPrayerTimes {
        let reference = &standard.times;
        let fetched = match self.method.source_kind() {
            SourceKind::Standard => return reference.clone(),
            SourceKind::RegionalTimetable => self.timetable.fetch(today, reference).await,
            SourceKind::WordPressPlugin { site } => self.wordpress.fetch(site, reference).await,
        };
        fetched.unwrap_or_else(|e| {
            tracing::info!(method = %self.method, error = %e, "Alternate source failed, using standard times");
            reference.clone()
        })
    }
}

/// Converts each `HH:MM` reading to its next occurrence in UTC. Readings
/// that cannot be parsed are logged and left out.
pub fn resolve_times(raw: &RawPrayerTimes, today: NaiveDate, now: DateTime<Utc>, tz: Tz) -> InstantMap {
    raw.iter()
        .filter_map(|(key, hhmm)| match local::next_occurrence(today, hhmm, now, tz) {
            Ok(at) => Some((key.to_string(), at)),
            Err(e) => {
                tracing::info!(key, hhmm, error = %e, "Skipping unparsable prayer time");
                None
            }
        })
        .collect()
}

/// The canonical prayer with the smallest instant strictly after `now`.
pub fn next_prayer(times: &InstantMap, now: DateTime<Utc>) -> Option<NextPrayer> {
    Prayer::ALL
        .into_iter()
        .filter_map(|prayer| times.get(prayer.as_str()).map(|at| NextPrayer { prayer, at: *at }))
        .filter(|n| n.at > now)
        .min_by_key(|n| n.at)
}

fn hijri_or_tabular(from_payload: Option<HijriDate>, today: NaiveDate) -> Option<HijriDate> {
    from_payload.or_else(|| match hijri::from_gregorian(today) {
        Ok(h) => {
            tracing::debug!(date = %h.date, "Hijri block missing, using tabular calendar");
            Some(h)
        }
        Err(e) => {
            tracing::info!(error = %e, "No Hijri date for this cycle");
            None
        }
    })
}
