//! Configuration management for kitewatch
//!
//! Handles loading configuration from a TOML file and environment variables,
//! and provides validation for all configuration settings. The loaded
//! [`KitewatchConfig`] is immutable and passed by reference into the pipeline.

use crate::conditions::PrecipitationScale;
use crate::{KitewatchError, Result};
use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KitewatchConfig {
    /// Where to look for wind
    pub location: LocationConfig,
    /// Forecast API settings
    pub forecast: ForecastConfig,
    /// Gating thresholds
    pub criteria: ConditionCriteria,
    /// Days and hours the activity is possible
    pub window: ActivityWindow,
    /// Favoured wind directions, cosmetic only
    pub bonus: BonusDirection,
    /// SMTP settings for the report
    pub email: EmailConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Postal code resolved through the geocoding API
    pub zip_code: Option<String>,
    /// Country of the postal code
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Skip geocoding when both coordinates are set
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Forecast API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the One Call API
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_forecast_timeout")]
    pub timeout_seconds: u32,
    /// How this source expresses probability of precipitation
    #[serde(default)]
    pub precipitation_scale: PrecipitationScale,
}

/// Thresholds for the gating rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionCriteria {
    /// Cloud cover must stay below this percentage
    #[serde(default = "default_max_cloud_cover")]
    pub max_cloud_cover: f64,
    /// Precipitation probability must stay below this percentage
    #[serde(default = "default_max_precipitation_probability")]
    pub max_precipitation_probability: f64,
    /// Inclusive temperature range in °F
    #[serde(default = "default_min_temperature")]
    pub min_temperature: f64,
    #[serde(default = "default_max_temperature")]
    pub max_temperature: f64,
    /// Minimum sustained wind in mph
    #[serde(default = "default_min_wind_speed")]
    pub min_wind_speed: f64,
    /// Optional upper wind limit in mph. TOML has no null, so
    /// `max_wind_speed = inf` removes the limit.
    #[serde(
        default = "default_max_wind_speed",
        deserialize_with = "deserialize_upper_limit"
    )]
    pub max_wind_speed: Option<f64>,
    /// Terms that disqualify a reading when found in its description
    #[serde(default = "default_excluded_descriptions")]
    pub excluded_descriptions: Vec<String>,
}

/// When the activity fits around work and daylight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityWindow {
    /// Days on which the daytime window applies
    #[serde(default = "default_weekend_days")]
    pub weekend_days: Vec<Weekday>,
    /// First local hour of the daytime window
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    /// Last local hour of the daytime window, inclusive
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    /// Also accept other days from `evening_start_hour` until sunset
    #[serde(default = "default_weekday_evenings")]
    pub weekday_evenings: bool,
    #[serde(default = "default_evening_start_hour")]
    pub evening_start_hour: u32,
}

/// Inclusive direction range that earns a star in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusDirection {
    #[serde(default = "default_bonus_min_degrees")]
    pub min_degrees: f64,
    #[serde(default = "default_bonus_max_degrees")]
    pub max_degrees: f64,
}

/// SMTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: Option<String>,
    /// Implicit TLS port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Login, also used as the sender address
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_country_code() -> String {
    "US".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.openweathermap.org/data/3.0".to_string()
}

fn default_geocoding_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_forecast_timeout() -> u32 {
    30
}

fn default_max_cloud_cover() -> f64 {
    85.0
}

fn default_max_precipitation_probability() -> f64 {
    25.0
}

fn default_min_temperature() -> f64 {
    45.0
}

fn default_max_temperature() -> f64 {
    95.0
}

fn default_min_wind_speed() -> f64 {
    8.0
}

#[allow(clippy::unnecessary_wraps)]
fn default_max_wind_speed() -> Option<f64> {
    Some(20.0)
}

fn deserialize_upper_limit<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let limit = f64::deserialize(deserializer)?;
    if limit.is_nan() {
        return Err(serde::de::Error::custom("upper limit must be a number or inf"));
    }
    Ok(limit.is_finite().then_some(limit))
}

fn default_excluded_descriptions() -> Vec<String> {
    vec!["rain".to_string()]
}

fn default_weekend_days() -> Vec<Weekday> {
    vec![Weekday::Fri, Weekday::Sat, Weekday::Sun]
}

fn default_start_hour() -> u32 {
    10
}

fn default_end_hour() -> u32 {
    18
}

fn default_weekday_evenings() -> bool {
    true
}

fn default_evening_start_hour() -> u32 {
    17
}

fn default_bonus_min_degrees() -> f64 {
    45.0
}

fn default_bonus_max_degrees() -> f64 {
    180.0
}

fn default_smtp_port() -> u16 {
    465
}

fn default_sender_name() -> String {
    "Kitewatch".to_string()
}

fn default_subject() -> String {
    "🪁 Upcoming kite conditions".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            zip_code: None,
            country_code: default_country_code(),
            latitude: None,
            longitude: None,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_forecast_base_url(),
            geocoding_url: default_geocoding_url(),
            timeout_seconds: default_forecast_timeout(),
            precipitation_scale: PrecipitationScale::default(),
        }
    }
}

impl Default for ConditionCriteria {
    fn default() -> Self {
        Self {
            max_cloud_cover: default_max_cloud_cover(),
            max_precipitation_probability: default_max_precipitation_probability(),
            min_temperature: default_min_temperature(),
            max_temperature: default_max_temperature(),
            min_wind_speed: default_min_wind_speed(),
            max_wind_speed: default_max_wind_speed(),
            excluded_descriptions: default_excluded_descriptions(),
        }
    }
}

impl Default for ActivityWindow {
    fn default() -> Self {
        Self {
            weekend_days: default_weekend_days(),
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            weekday_evenings: default_weekday_evenings(),
            evening_start_hour: default_evening_start_hour(),
        }
    }
}

impl Default for BonusDirection {
    fn default() -> Self {
        Self {
            min_degrees: default_bonus_min_degrees(),
            max_degrees: default_bonus_max_degrees(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: None,
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            sender_name: default_sender_name(),
            recipients: Vec::new(),
            subject: default_subject(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl KitewatchConfig {
    /// Load configuration from the given TOML file (if it exists) and the
    /// process environment, then validate it.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)?;
            toml::from_str(&contents).map_err(|e| {
                KitewatchError::config(format!(
                    "Failed to parse {}: {e}",
                    config_path.display()
                ))
            })?
        } else {
            tracing::debug!(
                "No config file at {}, using defaults and environment",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| KitewatchError::config(format!("Failed to parse configuration: {e}")))
    }

    /// Apply the plain environment variables the deployment sets
    /// (`API_KEY`, `ZIP_CODE`, `RECIPIENT`, `SENDER_USERNAME`,
    /// `SENDER_PASSWORD`, `SMTP_SERVER`, `SMTP_PORT`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = lookup("API_KEY") {
            self.forecast.api_key = Some(api_key);
        }
        if let Some(zip_code) = lookup("ZIP_CODE") {
            self.location.zip_code = Some(zip_code);
        }
        if let Some(recipients) = lookup("RECIPIENT") {
            self.email.recipients = recipients
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(username) = lookup("SENDER_USERNAME") {
            self.email.username = Some(username);
        }
        if let Some(password) = lookup("SENDER_PASSWORD") {
            self.email.password = Some(password);
        }
        if let Some(server) = lookup("SMTP_SERVER") {
            self.email.smtp_server = Some(server);
        }
        if let Some(port) = lookup("SMTP_PORT") {
            match port.trim().parse() {
                Ok(port) => self.email.smtp_port = port,
                Err(_) => tracing::warn!("Ignoring invalid SMTP_PORT value '{}'", port),
            }
        }
    }

    /// Validate everything needed to fetch and evaluate a forecast
    pub fn validate(&self) -> Result<()> {
        self.validate_forecast()?;
        self.validate_location()?;
        self.validate_criteria()?;
        self.validate_window()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_forecast(&self) -> Result<()> {
        match self.forecast.api_key.as_deref() {
            None => {
                return Err(KitewatchError::config(
                    "Forecast API key is required (set API_KEY or forecast.api_key)",
                ));
            }
            Some(key) if key.trim().is_empty() => {
                return Err(KitewatchError::config("Forecast API key cannot be empty"));
            }
            Some(_) => {}
        }

        for url in [&self.forecast.base_url, &self.forecast.geocoding_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(KitewatchError::config(format!(
                    "Forecast URL '{url}' must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        if self.forecast.timeout_seconds == 0 || self.forecast.timeout_seconds > 300 {
            return Err(KitewatchError::config(
                "Forecast timeout must be between 1 and 300 seconds",
            ));
        }

        Ok(())
    }

    fn validate_location(&self) -> Result<()> {
        let location = &self.location;
        match (location.latitude, location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(KitewatchError::config(format!(
                        "Coordinates out of range: lat={lat}, lon={lon}"
                    )));
                }
            }
            (None, None) => {
                if location.zip_code.as_deref().is_none_or(|z| z.trim().is_empty()) {
                    return Err(KitewatchError::config(
                        "A location is required: set ZIP_CODE or both latitude and longitude",
                    ));
                }
            }
            _ => {
                return Err(KitewatchError::config(
                    "Latitude and longitude must be set together",
                ));
            }
        }
        Ok(())
    }

    fn validate_criteria(&self) -> Result<()> {
        let criteria = &self.criteria;
        let percent = 0.0..=100.0;

        if !percent.contains(&criteria.max_cloud_cover) {
            return Err(KitewatchError::config("max_cloud_cover must be within 0-100"));
        }
        if !percent.contains(&criteria.max_precipitation_probability) {
            return Err(KitewatchError::config(
                "max_precipitation_probability must be within 0-100",
            ));
        }
        if criteria.min_temperature > criteria.max_temperature {
            return Err(KitewatchError::config(
                "min_temperature cannot exceed max_temperature",
            ));
        }
        if criteria.min_wind_speed < 0.0 {
            return Err(KitewatchError::config("min_wind_speed cannot be negative"));
        }
        if let Some(max) = criteria.max_wind_speed {
            if max < criteria.min_wind_speed {
                return Err(KitewatchError::config(
                    "max_wind_speed cannot be below min_wind_speed",
                ));
            }
        }
        if criteria
            .excluded_descriptions
            .iter()
            .any(|term| term.trim().is_empty())
        {
            return Err(KitewatchError::config(
                "excluded_descriptions cannot contain empty terms",
            ));
        }
        Ok(())
    }

    fn validate_window(&self) -> Result<()> {
        let window = &self.window;
        if window.start_hour > 23 || window.end_hour > 23 || window.evening_start_hour > 23 {
            return Err(KitewatchError::config("Window hours must be within 0-23"));
        }
        if window.start_hour > window.end_hour {
            return Err(KitewatchError::config(
                "Window start_hour cannot be after end_hour",
            ));
        }

        let degrees = 0.0..=360.0;
        if !degrees.contains(&self.bonus.min_degrees) || !degrees.contains(&self.bonus.max_degrees)
        {
            return Err(KitewatchError::config(
                "Bonus direction degrees must be within 0-360",
            ));
        }
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(KitewatchError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(KitewatchError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate SMTP settings; only needed when the report is emailed
    pub fn validate_email(&self) -> Result<()> {
        let email = &self.email;
        let missing = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());

        if missing(&email.smtp_server) {
            return Err(KitewatchError::config("SMTP server is required (SMTP_SERVER)"));
        }
        if missing(&email.username) || missing(&email.password) {
            return Err(KitewatchError::config(
                "SMTP credentials are required (SENDER_USERNAME, SENDER_PASSWORD)",
            ));
        }
        if email.recipients.is_empty() {
            return Err(KitewatchError::config("At least one recipient is required (RECIPIENT)"));
        }
        if email.smtp_port == 0 {
            return Err(KitewatchError::config("SMTP port cannot be 0"));
        }
        Ok(())
    }
}
