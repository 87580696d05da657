//! In-memory capabilities for tests and offline runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use miqat_calendar::hijri;
use miqat_network::{HttpFetch, PrayerTimeSource, StandardTimings};
use miqat_types::{CalculationMethod, Location, MiqatError};
use serde_json::Value;

/// Standard timings for a January day in Dublin, Hijri block included.
pub fn sample_timings() -> StandardTimings {
    StandardTimings {
        times: [
            ("Fajr", "06:40"),
            ("Sunrise", "08:30"),
            ("Dhuhr", "12:30"),
            ("Asr", "14:05"),
            ("Sunset", "16:30"),
            ("Maghrib", "16:38"),
            ("Isha", "18:18"),
            ("Imsak", "06:30"),
            ("Midnight", "00:34"),
        ]
        .into_iter()
        .collect(),
        hijri: Some(hijri::compose("28", 6, "Jumādá al-ākhirah", "1445", Some("28-06-1445"))),
    }
}

/// A standard source that answers with whatever it was last given.
pub struct ScriptedSource {
    result: Mutex<Result<StandardTimings, MiqatError>>,
    last_method: Mutex<Option<CalculationMethod>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(timings: StandardTimings) -> Self {
        Self::with_result(Ok(timings))
    }

    pub fn failing(error: MiqatError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<StandardTimings, MiqatError>) -> Self {
        Self {
            result: Mutex::new(result),
            last_method: Mutex::new(None),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, result: Result<StandardTimings, MiqatError>) {
        *self.result.lock().unwrap_or_else(PoisonError::into_inner) = result;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Method of the most recent call.
    pub fn last_method(&self) -> Option<CalculationMethod> {
        *self.last_method.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Highest number of calls ever running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrayerTimeSource for ScriptedSource {
    async fn fetch(
        &self,
        _location: Location,
        method: CalculationMethod,
        _date: NaiveDate,
    ) -> Result<StandardTimings, MiqatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        *self.last_method.lock().unwrap_or_else(PoisonError::into_inner) = Some(method);

        tokio::task::yield_now().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.result.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// HTTP capability backed by a URL to JSON table. Unknown URLs are
/// unavailable.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<BTreeMap<String, Value>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: impl Into<String>, body: Value) -> Self {
        self.set(url, body);
        self
    }

    pub fn set(&self, url: impl Into<String>, body: Value) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into(), body);
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl HttpFetch for ScriptedFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, MiqatError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .ok_or_else(|| MiqatError::source_unavailable(url, "HTTP 404 Not Found"))
    }
}
