//! Command-line arguments and how they become a [`CompanionConfig`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use miqat::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Latitude in decimal degrees (-90 to 90)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_latitude)]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees (-180 to 180)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_longitude)]
    pub longitude: Option<f64>,

    /// Calculation method, e.g. isna, mwl, makkah, ie-icci
    #[arg(long)]
    pub method: Option<CalculationMethod>,

    /// IANA time zone name; defaults to the system zone
    #[arg(long)]
    pub time_zone: Option<String>,

    /// Resolve once, print the result and exit
    #[arg(long)]
    pub once: bool,
}

fn parse_latitude(s: &str) -> Result<f64, String> {
    parse_bounded(s, 90.0)
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    parse_bounded(s, 180.0)
}

fn parse_bounded(s: &str, limit: f64) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(format!("{} is outside -{}..={}", value, limit, limit));
    }
    Ok(value)
}

impl Args {
    pub fn load_config(&self) -> Result<CompanionConfig> {
        let mut config = match &self.config {
            Some(path) => CompanionConfig::from_path(path)?,
            None => {
                let (latitude, longitude) = self
                    .latitude
                    .zip(self.longitude)
                    .context("--latitude and --longitude are required without --config")?;
                CompanionConfig::new(Location::new(latitude, longitude)?)
            }
        };

        if let Some(latitude) = self.latitude {
            config.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            config.longitude = longitude;
        }
        if let Some(method) = self.method {
            config.calculation_method = method;
        }
        if let Some(tz) = &self.time_zone {
            config.time_zone = Some(tz.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_only() {
        let args = Args::try_parse_from([
            "miqat", "--latitude", "53.35", "--longitude", "-6.26", "--method", "ie-mcnd", "--time-zone",
            "Europe/Dublin", "--once",
        ])
        .unwrap();
        assert!(args.once);
        let config = args.load_config().unwrap();
        assert_eq!(config.calculation_method, CalculationMethod::IeMcnd);
        assert_eq!(config.time_zone.as_deref(), Some("Europe/Dublin"));
        assert_eq!(config.longitude, -6.26);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Args::try_parse_from(["miqat", "--latitude", "91", "--longitude", "0"]).is_err());
        assert!(Args::try_parse_from(["miqat", "--latitude", "1", "--longitude", "0", "--method", "lunar"]).is_err());
    }

    #[test]
    fn test_location_required_without_file() {
        let args = Args::try_parse_from(["miqat", "--latitude", "10"]).unwrap();
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let path = std::env::temp_dir().join(format!("miqat-cli-test-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"latitude": 21.42, "longitude": 39.83, "calculation_method": "makkah"}"#).unwrap();

        let args = Args::try_parse_from([
            "miqat", "--config", path.to_str().unwrap(), "--method", "mwl", "--time-zone", "Asia/Riyadh",
        ])
        .unwrap();
        let config = args.load_config().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.latitude, 21.42);
        assert_eq!(config.calculation_method, CalculationMethod::Mwl);
    }
}
