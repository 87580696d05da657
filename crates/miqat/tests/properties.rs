use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;
use miqat::calendar::{codec, hijri, local};
use miqat::prelude::*;
use miqat::{next_prayer, next_update_at, resolve_times};
use proptest::prelude::*;

const ZONES: [Tz; 4] = [
    chrono_tz::Europe::Dublin,
    chrono_tz::America::New_York,
    chrono_tz::Asia::Riyadh,
    chrono_tz::Australia::Sydney,
];

fn hhmm() -> impl Strategy<Value = String> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{:02}:{:02}", h, m))
}

proptest! {
    /// Formatting with an offset wraps the hour and keeps the minute.
    #[test]
    fn codec_offset_wraps(h in 0u32..24, m in 0u32..60, offset in -48i32..48) {
        let (hour, minute) = codec::parse(&codec::format(h, m, offset)).unwrap();
        prop_assert_eq!(hour as i32, (h as i32 + offset).rem_euclid(24));
        prop_assert_eq!(minute, m);
    }

    /// The hour correction is antisymmetric and zero within the tolerance.
    #[test]
    fn correction_antisymmetric(a in hhmm(), b in hhmm()) {
        let ab = miqat::calendar::hour_offset(&a, &b);
        let ba = miqat::calendar::hour_offset(&b, &a);
        prop_assert!((-1..=1).contains(&ab));
        prop_assert_eq!(ab, -ba);
    }

    /// Invariant: no resolved instant is in the past, next prayer is the
    /// earliest canonical instant after now, and the next refresh is ahead.
    #[test]
    fn resolution_invariants(
        readings in proptest::collection::vec(hhmm(), 9),
        minutes in 0i64..(2 * 366 * 24 * 60),
        zone in 0usize..ZONES.len(),
    ) {
        let tz = ZONES[zone];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        let today = local::local_date(now, tz);
        let raw: RawPrayerTimes = TimeMarker::ALL
            .iter()
            .zip(readings.iter())
            .map(|(marker, t)| (marker.as_str(), t.as_str()))
            .collect();

        let resolved = resolve_times(&raw, today, now, tz);
        prop_assert_eq!(resolved.len(), TimeMarker::ALL.len());
        for at in resolved.values() {
            prop_assert!(*at >= now, "{} resolved before {}", at, now);
        }

        match next_prayer(&resolved, now) {
            Some(next) => {
                prop_assert!(next.at > now);
                for prayer in Prayer::ALL {
                    let at = resolved[prayer.as_str()];
                    prop_assert!(at <= now || at >= next.at);
                }
            }
            None => {
                for prayer in Prayer::ALL {
                    prop_assert!(resolved[prayer.as_str()] <= now);
                }
            }
        }

        let midnight = resolved.get(TimeMarker::Midnight.as_str()).copied();
        prop_assert!(next_update_at(now, midnight, tz) > now);
    }

    /// Invariant: the tabular Hijri fallback never panics inside its range.
    #[test]
    fn hijri_fallback_total(days in 0i64..(135 * 365)) {
        let date = chrono::NaiveDate::from_ymd_opt(1940, 1, 1).unwrap() + Duration::days(days);
        let h = hijri::from_gregorian(date).unwrap();
        prop_assert!((1..=12).contains(&h.month_number));
        prop_assert_eq!(h.month_name.as_str(), hijri::month_name(h.month_number));
    }
}
