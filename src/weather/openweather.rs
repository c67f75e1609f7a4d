//! OpenWeatherMap forecast and geocoding client
//!
//! Probability of precipitation (`pop`) is reported by OpenWeatherMap as a
//! fraction in [0, 1].

use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use super::ForecastSource;
use crate::config::{ForecastConfig, LocationConfig};
use crate::models::{Forecast, Location, RawRecord};
use crate::{KitewatchError, Result};

const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    api_key: String,
    base_url: String,
    geocoding_url: String,
}

/// Place returned by the zip geocoding endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodedPlace {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
}

impl GeocodedPlace {
    /// `Chicago, US`, or just the name when no country came back
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.country.as_deref() {
            Some(country) if !country.is_empty() => format!("{}, {country}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// The parts of a One Call response the pipeline uses
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    pub lat: f64,
    pub lon: f64,
    /// IANA zone name, e.g. `America/Chicago`
    pub timezone: String,
    #[serde(default)]
    pub hourly: Vec<RawRecord>,
    #[serde(default)]
    pub daily: Vec<RawRecord>,
}

impl OneCallResponse {
    /// Attach the response to a named place, resolving its time zone
    pub fn into_forecast(self, name: String) -> Result<Forecast> {
        let timezone: Tz = self.timezone.parse().map_err(|_| {
            KitewatchError::upstream(format!(
                "Forecast returned unknown time zone '{}'",
                self.timezone
            ))
        })?;

        let location = Location::new(self.lat, self.lon, name, timezone);
        Ok(Forecast::new(location, self.hourly, self.daily))
    }
}

impl OpenWeatherClient {
    pub fn new(config: &ForecastConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| KitewatchError::config("Forecast API key is required"))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(|e| KitewatchError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a postal code to coordinates
    #[instrument(skip(self))]
    pub async fn geocode_zip(&self, zip_code: &str, country_code: &str) -> Result<GeocodedPlace> {
        let url = format!(
            "{}/zip?zip={},{}&appid={}",
            self.geocoding_url,
            urlencoding::encode(zip_code.trim()),
            urlencoding::encode(country_code.trim()),
            urlencoding::encode(&self.api_key)
        );

        let place: GeocodedPlace = self.get_json(&url, "geocoding").await?;
        debug!(
            "Found location: {} ({:.4}, {:.4})",
            place.name, place.lat, place.lon
        );
        Ok(place)
    }

    /// Fetch hourly and daily forecast for coordinates, in imperial units
    #[instrument(skip(self))]
    pub async fn one_call(&self, latitude: f64, longitude: f64) -> Result<OneCallResponse> {
        let url = format!(
            "{}/onecall?lat={latitude}&lon={longitude}&units=imperial&exclude=current,minutely,alerts&appid={}",
            self.base_url,
            urlencoding::encode(&self.api_key)
        );

        self.get_json(&url, "forecast").await
    }

    /// The URL carries the API key, so it is never logged
    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| {
                KitewatchError::upstream(format!("{what} request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            KitewatchError::upstream(format!("Failed to read {what} response: {e}"))
        })?;

        check_status(status, &body, what)?;

        serde_json::from_str(&body)
            .map_err(|e| KitewatchError::upstream(format!("Failed to parse {what} response: {e}")))
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherClient {
    async fn fetch_forecast(&self, location: &LocationConfig) -> Result<Forecast> {
        let (latitude, longitude, name) = match (location.latitude, location.longitude) {
            (Some(lat), Some(lon)) => (lat, lon, format!("{lat:.4}, {lon:.4}")),
            _ => {
                let zip_code = location.zip_code.as_deref().ok_or_else(|| {
                    KitewatchError::config("No zip code or coordinates configured")
                })?;
                let place = self.geocode_zip(zip_code, &location.country_code).await?;
                (place.lat, place.lon, place.display_name())
            }
        };

        self.one_call(latitude, longitude)
            .await?
            .into_forecast(name)
    }
}

fn check_status(status: StatusCode, body: &str, what: &str) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(KitewatchError::upstream(format!(
            "Location not found ({what})"
        ))),
        StatusCode::UNAUTHORIZED => Err(KitewatchError::upstream(format!(
            "{what} request rejected, check the API key"
        ))),
        s => Err(KitewatchError::upstream(format!(
            "{what} request failed with status {s}: {}",
            truncate_body(body)
        ))),
    }
}

fn truncate_body(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
