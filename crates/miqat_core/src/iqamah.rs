//! Iqamah (congregation) times.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use miqat_calendar::local;
use miqat_network::HttpFetch;
use miqat_network::iqamah::fetch_iqamah_times;
use miqat_types::{InstantMap, IqamahMethod, MiqatError, Prayer};

use crate::config::CompanionConfig;

/// Iqamah derivation chosen for a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IqamahSettings {
    /// Minutes after each resolved prayer.
    Offsets(BTreeMap<Prayer, i64>),
    /// Custom endpoint URL.
    Api(String),
    /// Configuration could not be used; iqamah keys are left out.
    Disabled(MiqatError),
}

impl IqamahSettings {
    pub fn from_config(config: &CompanionConfig) -> Self {
        let settings = match config.iqamah_method {
            IqamahMethod::Offset => config.resolved_iqamah_offsets().map(IqamahSettings::Offsets),
            IqamahMethod::Api => config.iqamah_api_url().map(|u| IqamahSettings::Api(u.to_string())),
        };
        settings.unwrap_or_else(IqamahSettings::Disabled)
    }

    /// Derives the `iqamah_<Prayer>` instants. Never fails: unusable
    /// configuration or an unreachable endpoint yields an empty map.
    pub async fn derive(
        &self,
        http: &dyn HttpFetch,
        resolved: &InstantMap,
        today: NaiveDate,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> InstantMap {
        match self {
            IqamahSettings::Offsets(offsets) => from_offsets(resolved, offsets, tz),
            IqamahSettings::Api(url) => from_api(http, url, today, now, tz).await,
            IqamahSettings::Disabled(reason) => {
                tracing::info!(%reason, "Iqamah times disabled for this cycle");
                InstantMap::new()
            }
        }
    }
}

/// Adds each prayer's offset on the local wall clock. Prayers without a
/// resolved instant get no iqamah.
pub fn from_offsets(resolved: &InstantMap, offsets: &BTreeMap<Prayer, i64>, tz: Tz) -> InstantMap {
    Prayer::ALL
        .into_iter()
        .filter_map(|prayer| {
            let base = resolved.get(prayer.as_str())?;
            let minutes = offsets.get(&prayer).copied().unwrap_or_else(|| prayer.default_iqamah_offset());
            local::add_local_minutes(*base, minutes, tz).map(|at| (prayer.iqamah_key(), at))
        })
        .collect()
}

/// Reads iqamah readings from the custom endpoint and resolves each to its
/// next occurrence.
pub async fn from_api(http: &dyn HttpFetch, url: &str, today: NaiveDate, now: DateTime<Utc>, tz: Tz) -> InstantMap {
    let readings = match fetch_iqamah_times(http, url).await {
        Ok(readings) => readings,
        Err(e) => {
            tracing::info!(url, error = %e, "Failed to retrieve iqamah times");
            return InstantMap::new();
        }
    };

    let mut times = InstantMap::new();
    for (prayer, reading) in readings {
        match local::next_occurrence(today, &reading, now, tz) {
            Ok(at) => {
                times.insert(prayer.iqamah_key(), at);
            }
            Err(e) => tracing::info!(%prayer, %reading, error = %e, "Skipping unparsable iqamah time"),
        }
    }
    times
}
