use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::Result;
use crate::config::LocationConfig;
use crate::models::{Forecast, Location};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Supplies the raw forecast the pipeline evaluates
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Resolve the configured location and fetch its hourly and daily records.
    ///
    /// Any failure here is fatal for the run.
    async fn fetch_forecast(&self, location: &LocationConfig) -> Result<Forecast>;
}

/// Sunset at the location on the given local date.
///
/// `None` when the coordinates are invalid or the sun does not set that
/// day (polar day or polar night).
#[must_use]
pub fn sunset(location: &Location, date: NaiveDate) -> Option<DateTime<Utc>> {
    let coordinates = Coordinates::new(location.latitude, location.longitude)?;
    SolarDay::new(coordinates, date).event_time(SolarEvent::Sunset)
}

/// Latest instant on `date` that still counts as daylight at the location.
///
/// Normally local sunset. Under the midnight sun the day never ends before
/// local midnight, so the last second of the local date is returned. During
/// polar night, or for invalid coordinates, there is no daylight evening.
#[must_use]
pub fn daylight_until(location: &Location, date: NaiveDate) -> Option<DateTime<Utc>> {
    if let Some(sunset) = sunset(location, date) {
        return Some(sunset);
    }

    Coordinates::new(location.latitude, location.longitude)?;
    if !is_polar_day(location.latitude, date) {
        return None;
    }

    let last_second = date.and_hms_opt(23, 59, 59)?;
    location
        .timezone
        .from_local_datetime(&last_second)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// The sun stays up when the latitude is on the same side of the equator as
/// the solar declination. Only meaningful once a sunset lookup has failed.
fn is_polar_day(latitude: f64, date: NaiveDate) -> bool {
    let day_of_year = f64::from(date.ordinal());
    let declination = -23.44 * (360.0 / 365.0 * (day_of_year + 10.0)).to_radians().cos();
    latitude * declination > 0.0
}
