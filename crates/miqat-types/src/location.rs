use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MiqatError;

/// Geographic location the prayer times are computed for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Creates a validated location.
    ///
    /// # Errors
    /// Returns `Configuration` if either coordinate is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MiqatError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(MiqatError::invalid_config(format!(
                "Latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(MiqatError::invalid_config(format!(
                "Longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }

    /// Creates a location without range checks.
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°, {:.4}°", self.latitude, self.longitude)
    }
}
