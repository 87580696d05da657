//! Custom iqamah endpoint.

use std::collections::BTreeMap;

use miqat_types::{MiqatError, Prayer};
use serde_json::Value;

use crate::http::HttpFetch;

/// Fetches `HH:MM` iqamah readings keyed by canonical prayer.
///
/// The endpoint returns a JSON object whose keys are prayer names, either
/// capitalised (`"Fajr"`) or lowercase (`"fajr"`). Prayers the endpoint
/// omits are simply absent from the result.
pub async fn fetch_iqamah_times(http: &dyn HttpFetch, url: &str) -> Result<BTreeMap<Prayer, String>, MiqatError> {
    let body = http.get_json(url).await?;
    parse_iqamah(&body)
}

fn parse_iqamah(body: &Value) -> Result<BTreeMap<Prayer, String>, MiqatError> {
    let object = body
        .as_object()
        .ok_or_else(|| MiqatError::parse("iqamah response", "expected a JSON object"))?;

    let times = Prayer::ALL
        .into_iter()
        .filter_map(|prayer| {
            let name = prayer.as_str();
            object
                .get(name)
                .or_else(|| object.get(&name.to_ascii_lowercase()))
                .and_then(Value::as_str)
                .map(|t| (prayer, t.trim().to_string()))
        })
        .collect();
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_case_keys() {
        let body = json!({"Fajr": "06:15", "dhuhr": "13:30", "Asr": 15, "unknown": "01:00"});
        let times = parse_iqamah(&body).unwrap();
        assert_eq!(times.get(&Prayer::Fajr).map(String::as_str), Some("06:15"));
        assert_eq!(times.get(&Prayer::Dhuhr).map(String::as_str), Some("13:30"));
        assert!(!times.contains_key(&Prayer::Asr));
        assert_eq!(times.len(), 2);
    }

    #[test]
    fn test_not_an_object() {
        assert!(parse_iqamah(&json!(["06:15"])).is_err());
    }
}
