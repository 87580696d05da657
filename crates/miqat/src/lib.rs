//! # Miqat
//!
//! Daily Islamic prayer times for one location, reconciled across a
//! calculation service and regional timetables, with iqamah times, the
//! Hijri date and the next prayer.
//!
//! This crate is a facade that re-exports functionality from the `miqat` ecosystem.
//!
//! ## Modules
//!
//! - `types`: Core types (Prayer, CalculationMethod, PrayerSnapshot, etc.)
//! - `calendar`: `HH:MM` codec, DST hour correction, local time, Hijri
//! - `network`: Aladhan calculator, regional timetables, iqamah endpoint
//!
//! ## Usage
//!
//! ```no_run
//! use miqat::prelude::*;
//!
//! # async fn run() -> Result<(), MiqatError> {
//! let config = CompanionConfig::new(Location::new(53.35, -6.26)?).time_zone_name("Europe/Dublin");
//! let companion = PrayerCompanion::new(config.clone(), Dependencies::production(&config)?)?;
//! let snapshot = companion.start().await?;
//! println!("{:?}", snapshot.next_prayer);
//! # Ok(())
//! # }
//! ```

pub use miqat_core::*;
