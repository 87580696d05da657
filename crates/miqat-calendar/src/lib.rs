//! Time handling for miqat: the `HH:MM` codec, the DST hour corrector,
//! local civil time helpers and Hijri records.

pub mod codec;
pub mod hijri;
pub mod local;
pub mod offset;

pub use local::{next_occurrence, start_of_local_day, system_timezone};
pub use offset::correct as hour_offset;
