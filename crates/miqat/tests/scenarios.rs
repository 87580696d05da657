//! End-to-end cycles against stubbed HTTP endpoints.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use miqat::network::{AladhanSource, HttpFetch, ReqwestFetcher};
use miqat::prelude::*;
use miqat::{FixedClock, ScheduledTrigger, TriggerKind};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, h, m, 0).unwrap()
}

fn aladhan_body() -> Value {
    json!({
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:01", "Sunrise": "06:42", "Dhuhr": "12:39", "Asr": "15:59",
                "Sunset": "18:36", "Maghrib": "18:36", "Isha": "20:11", "Imsak": "04:51",
                "Midnight": "00:39"
            },
            "date": {
                "hijri": {
                    "date": "10-09-1445",
                    "day": "10",
                    "month": { "number": 9, "en": "Ramaḍān" },
                    "year": "1445"
                }
            }
        }
    })
}

async fn mount_aladhan(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/timings/\d{2}-\d{2}-\d{4}$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(aladhan_body()))
        .mount(server)
        .await;
}

struct Harness {
    server: MockServer,
    clock: Arc<FixedClock>,
    config: CompanionConfig,
}

impl Harness {
    async fn new(now: DateTime<Utc>, calculation_method: CalculationMethod) -> Self {
        let server = MockServer::start().await;
        let config = CompanionConfig::new(Location::new(53.35, -6.26).unwrap())
            .time_zone_name("Europe/Dublin")
            .calculation_method(calculation_method)
            .endpoints(miqat::Endpoints {
                aladhan_base_url: server.uri(),
                regional_timetable_url: format!("{}/api/timetable/", server.uri()),
                wordpress_url_template: format!("{}/{{site}}/wp-json/dpt/v1/prayertime?filter=today", server.uri()),
            });
        Self {
            server,
            clock: Arc::new(FixedClock::new(now)),
            config,
        }
    }

    fn companion(&self, config: CompanionConfig) -> PrayerCompanion {
        let http: Arc<dyn HttpFetch> = Arc::new(ReqwestFetcher::new(StdDuration::from_secs(5)).unwrap());
        let deps = Dependencies {
            clock: self.clock.clone(),
            standard: Arc::new(AladhanSource::with_base_url(http.clone(), self.server.uri())),
            http,
        };
        PrayerCompanion::new(config, deps).unwrap()
    }
}

#[tokio::test]
async fn fajr_later_today_stays_today() {
    let h = Harness::new(utc(20, 4, 0), CalculationMethod::Isna).await;
    mount_aladhan(&h.server).await;
    let companion = h.companion(h.config.clone());

    let snapshot = companion.start().await.unwrap();
    assert_eq!(snapshot.time_of(TimeMarker::Fajr), Some(utc(20, 5, 1)));
    assert_eq!(
        snapshot.next_prayer,
        Some(NextPrayer { prayer: Prayer::Fajr, at: utc(20, 5, 1) })
    );
    assert_eq!(snapshot.get("hijri_date_readable"), Some(SensorValue::Text("10-Ramaḍān-1445".into())));
    companion.teardown();
}

#[tokio::test]
async fn passed_fajr_rolls_to_tomorrow() {
    let h = Harness::new(utc(20, 6, 0), CalculationMethod::Isna).await;
    mount_aladhan(&h.server).await;
    let companion = h.companion(h.config.clone());

    let snapshot = companion.start().await.unwrap();
    assert_eq!(snapshot.time_of(TimeMarker::Fajr), Some(utc(21, 5, 1)));
    assert_eq!(snapshot.time_of(TimeMarker::Midnight), Some(utc(21, 0, 39)));
    assert_eq!(snapshot.next_prayer.map(|n| n.prayer), Some(Prayer::Dhuhr));
    assert_eq!(
        companion.pending_trigger(),
        Some(ScheduledTrigger { at: utc(21, 0, 0), kind: TriggerKind::Midnight })
    );
    companion.teardown();
}

#[tokio::test]
async fn regional_timetable_is_shifted_back_an_hour() {
    let h = Harness::new(utc(20, 4, 0), CalculationMethod::IeIcci).await;
    mount_aladhan(&h.server).await;
    Mock::given(method("GET"))
        .and(path("/api/timetable/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timetable": {"3": {"20": [[6, 3], [7, 42], [13, 39], [16, 59], [19, 36], [21, 11]]}}
        })))
        .mount(&h.server)
        .await;
    let companion = h.companion(h.config.clone());

    let snapshot = companion.start().await.unwrap();
    assert_eq!(snapshot.method, CalculationMethod::IeIcci);
    assert_eq!(snapshot.time_of(TimeMarker::Fajr), Some(utc(20, 5, 3)));
    assert_eq!(snapshot.time_of(TimeMarker::Dhuhr), Some(utc(20, 12, 39)));
    assert_eq!(snapshot.time_of(TimeMarker::Maghrib), Some(utc(20, 18, 36)));
    assert_eq!(snapshot.time_of(TimeMarker::Isha), Some(utc(20, 20, 11)));
    assert_eq!(snapshot.time_of(TimeMarker::Midnight), Some(utc(21, 0, 39)));
    companion.teardown();
}

#[tokio::test]
async fn maghrib_iqamah_uses_offset() {
    let h = Harness::new(utc(20, 4, 0), CalculationMethod::Isna).await;
    mount_aladhan(&h.server).await;
    let companion = h.companion(h.config.clone().iqamah_offset(Prayer::Fajr, 30_i64));

    let snapshot = companion.start().await.unwrap();
    assert_eq!(snapshot.iqamah_of(Prayer::Maghrib), Some(utc(20, 18, 46)));
    assert_eq!(snapshot.iqamah_of(Prayer::Fajr), Some(utc(20, 5, 31)));
    assert_eq!(snapshot.get("iqamah_Isha"), Some(SensorValue::Timestamp(utc(20, 20, 26))));
    companion.teardown();
}

#[tokio::test]
async fn iqamah_api_times_are_localised() {
    let h = Harness::new(utc(20, 13, 0), CalculationMethod::Isna).await;
    mount_aladhan(&h.server).await;
    Mock::given(method("GET"))
        .and(path("/iqamah"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fajr": "05:30", "Isha": "20:30"})))
        .mount(&h.server)
        .await;
    let config = h
        .config
        .clone()
        .iqamah_method(IqamahMethod::Api)
        .custom_iqamah_api(format!("{}/iqamah", h.server.uri()));
    let companion = h.companion(config);

    let snapshot = companion.start().await.unwrap();
    assert_eq!(snapshot.iqamah_of(Prayer::Fajr), Some(utc(21, 5, 30)));
    assert_eq!(snapshot.iqamah_of(Prayer::Isha), Some(utc(20, 20, 30)));
    assert_eq!(snapshot.iqamah_of(Prayer::Dhuhr), None);
    companion.teardown();
}

#[tokio::test]
async fn wordpress_outage_falls_back_to_standard() {
    let h = Harness::new(utc(20, 4, 0), CalculationMethod::IeHicc).await;
    mount_aladhan(&h.server).await;
    Mock::given(method("GET"))
        .and(path("/hicc/wp-json/dpt/v1/prayertime"))
        .and(query_param("filter", "today"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;
    let companion = h.companion(h.config.clone());

    let snapshot = companion.start().await.unwrap();
    let expected: Vec<(&str, DateTime<Utc>)> = vec![
        ("Asr", utc(20, 15, 59)),
        ("Dhuhr", utc(20, 12, 39)),
        ("Fajr", utc(20, 5, 1)),
        ("Imsak", utc(20, 4, 51)),
        ("Isha", utc(20, 20, 11)),
        ("Maghrib", utc(20, 18, 36)),
        ("Midnight", utc(21, 0, 39)),
        ("Sunrise", utc(20, 6, 42)),
        ("Sunset", utc(20, 18, 36)),
    ];
    let actual: Vec<(&str, DateTime<Utc>)> =
        snapshot.prayer_times.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(actual, expected);
    companion.teardown();
}

#[tokio::test]
async fn calculation_failure_keeps_snapshot_and_retries() {
    let h = Harness::new(utc(20, 4, 0), CalculationMethod::Isna).await;
    mount_aladhan(&h.server).await;
    let companion = h.companion(h.config.clone());
    let first = companion.start().await.unwrap();

    h.server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;
    h.clock.advance(Duration::hours(2));

    let err = companion.request_refresh().await.unwrap_err();
    assert!(matches!(err, MiqatError::CalculationFailure(_)));
    assert_eq!(companion.data(), Some(first));
    assert_eq!(
        companion.pending_trigger(),
        Some(ScheduledTrigger { at: utc(20, 6, 1), kind: TriggerKind::Retry })
    );
    companion.teardown();
    assert_eq!(companion.pending_trigger(), None);
}

#[tokio::test]
async fn first_refresh_failure_arms_retry() {
    let h = Harness::new(utc(20, 4, 0), CalculationMethod::Isna).await;
    let companion = h.companion(h.config.clone());

    assert!(companion.start().await.is_err());
    assert!(companion.data().is_none());
    assert_eq!(companion.pending_trigger().map(|t| t.kind), Some(TriggerKind::Retry));
    companion.teardown();
}

#[tokio::test]
async fn snapshot_serialises_to_json() {
    let h = Harness::new(utc(20, 4, 0), CalculationMethod::Isna).await;
    mount_aladhan(&h.server).await;
    let companion = h.companion(h.config.clone());

    let snapshot = companion.start().await.unwrap();
    let values = serde_json::to_value(snapshot.to_values()).unwrap();
    assert_eq!(values["Fajr"], json!("2024-03-20T05:01:00Z"));
    assert_eq!(values["hijri_month_num"], json!(9));
    assert_eq!(values["next_prayer_name"], json!("Fajr"));
    companion.teardown();
}
