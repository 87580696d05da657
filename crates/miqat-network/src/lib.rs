//! Network sources for miqat.
//!
//! - [`aladhan`]: the standard calculator, also the final fallback.
//! - [`timetable`]: the regional `ie-icci` timetable.
//! - [`wordpress`]: sites using the WordPress prayer time plugin.
//! - [`iqamah`]: optional custom iqamah endpoint.
//!
//! Every request goes through the [`http::HttpFetch`] capability.

pub mod aladhan;
pub mod alternate;
pub mod http;
pub mod iqamah;
pub mod timetable;
pub mod wordpress;

pub use aladhan::{AladhanSource, PrayerTimeSource, StandardTimings};
pub use http::{HttpFetch, ReqwestFetcher};
pub use timetable::RegionalTimetable;
pub use wordpress::WordPressPlugin;
