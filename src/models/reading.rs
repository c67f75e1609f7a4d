//! Normalized forecast reading

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a record describes one hour or a whole day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    /// Daily aggregates may legitimately come without cloud cover
    #[must_use]
    pub fn requires_cloud_cover(self) -> bool {
        matches!(self, Granularity::Hourly)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Hourly => write!(f, "hourly"),
            Granularity::Daily => write!(f, "daily"),
        }
    }
}

/// One forecast data point in canonical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReading {
    /// Time the data point refers to
    pub timestamp: DateTime<Utc>,
    /// Temperature in °F
    pub temperature: f64,
    /// Sustained wind speed in mph
    pub wind_speed: f64,
    /// Wind direction in degrees, 0 is North, always in [0, 360)
    pub wind_direction: f64,
    /// Cloud cover percentage (0-100), absent for some daily shapes
    pub cloud_cover_percent: Option<f64>,
    /// Probability of precipitation (0-100)
    pub precipitation_probability_percent: f64,
    /// Human-readable description of weather conditions
    pub description: String,
    pub granularity: Granularity,
}
