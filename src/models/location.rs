//! Location model for geographic coordinates and local time

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// The spot the forecast is evaluated for
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, region, etc.)
    pub name: String,
    /// IANA time zone of the location
    pub timezone: Tz,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String, timezone: Tz) -> Self {
        Self {
            latitude,
            longitude,
            name,
            timezone,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Wall-clock time at the location
    #[must_use]
    pub fn local_time(&self, timestamp: DateTime<Utc>) -> DateTime<Tz> {
        timestamp.with_timezone(&self.timezone)
    }

    /// Calendar date at the location
    #[must_use]
    pub fn local_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        self.local_time(timestamp).date_naive()
    }
}
