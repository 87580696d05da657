//! Core types for miqat: locations, calculation methods, prayer time maps,
//! the published snapshot and the error taxonomy.

pub mod error;
pub mod location;
pub mod method;
pub mod prayer;
pub mod snapshot;

pub use error::MiqatError;
pub use location::Location;
pub use method::{CalculationMethod, IqamahMethod, SourceKind};
pub use prayer::{HijriDate, InstantMap, NextPrayer, Prayer, RawPrayerTimes, TimeMarker};
pub use snapshot::{PrayerSnapshot, SensorDescription, SensorValue, SENSOR_DESCRIPTIONS};
