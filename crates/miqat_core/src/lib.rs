//! Prayer time resolution and refresh scheduling.
//!
//! [`DailyResolver`] turns one standard calculation (plus an optional
//! alternate timetable) into UTC instants, iqamah times, a Hijri date and
//! the next prayer. [`PrayerCompanion`] runs it at each local day boundary
//! and every hour, and keeps the last good [`PrayerSnapshot`] published.

pub mod clock;
pub mod companion;
pub mod config;
pub mod iqamah;
#[cfg(any(test, feature = "testing"))]
pub mod mocks;
pub mod resolver;
pub mod scheduler;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use companion::{Dependencies, PrayerCompanion};
pub use config::{CompanionConfig, Endpoints, OffsetSetting};
pub use iqamah::IqamahSettings;
pub use resolver::{DailyResolver, Resolution, next_prayer, resolve_times};
pub use scheduler::{RefreshScheduler, ScheduledTrigger, SchedulerState, TriggerKind, next_update_at};
pub use timer::OneShotTimer;

pub use miqat_calendar as calendar;
pub use miqat_network as network;
pub use miqat_types as types;
pub use miqat_types::{
    CalculationMethod, HijriDate, IqamahMethod, Location, MiqatError, NextPrayer, Prayer, PrayerSnapshot,
    SensorValue, TimeMarker, SENSOR_DESCRIPTIONS,
};

pub mod prelude {
    pub use crate::types::*;
    pub use crate::{CompanionConfig, Dependencies, PrayerCompanion};
}
