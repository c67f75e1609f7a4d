//! Field normalizer: raw forecast records to [`NormalizedReading`]
//!
//! Two record shapes are understood. The One Call shape keeps fields flat
//! (`temp`, `wind_speed`, `wind_deg`, numeric `clouds`) and gives daily
//! records a composite `temp` object. The 5 day / 3 hour shape nests them
//! (`main.temp`, `wind.speed`, `wind.deg`, `clouds.all`). Both carry `dt`,
//! `pop` and a `weather` annotation list.
//!
//! A composite temperature is always collapsed to its `day` value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wind::normalize_degrees;
use crate::models::{Granularity, NormalizedReading, RawRecord};
use crate::{KitewatchError, Result};

const TIMESTAMP: &[&str] = &["dt"];
const TEMPERATURE: &[&str] = &["temp", "main.temp"];
const WIND_SPEED: &[&str] = &["wind_speed", "wind.speed"];
const WIND_DIRECTION: &[&str] = &["wind_deg", "wind.deg"];
// `clouds.all` first: in the One Call shape `clouds` is already the number
const CLOUD_COVER: &[&str] = &["clouds.all", "clouds"];
const PRECIPITATION: &[&str] = &["pop"];

/// How a forecast source expresses probability of precipitation.
///
/// This is a property of the source and must be configured; a value of
/// `1` is ambiguous between "certain" and "one percent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationScale {
    /// 0.0 - 1.0, as OpenWeatherMap reports `pop`
    #[default]
    Fraction,
    /// 0 - 100
    Percent,
}

impl PrecipitationScale {
    #[must_use]
    pub fn to_percent(self, value: f64) -> f64 {
        match self {
            PrecipitationScale::Fraction => value * 100.0,
            PrecipitationScale::Percent => value,
        }
    }
}

/// Extract a uniform reading from one raw record.
///
/// # Errors
///
/// Returns [`KitewatchError::IncompleteData`] when a field a gating rule
/// needs is missing, has an unexpected type, or is out of range.
pub fn normalize(
    raw: &RawRecord,
    granularity: Granularity,
    scale: PrecipitationScale,
) -> Result<NormalizedReading> {
    let field = FieldReader { raw, granularity };

    let timestamp = field.timestamp()?;
    let temperature = field.temperature()?;
    let wind_speed = field.number("wind_speed", WIND_SPEED)?;
    let wind_direction = normalize_degrees(field.number("wind_direction", WIND_DIRECTION)?);

    let cloud_cover_percent = match field.optional_number("cloud_cover", CLOUD_COVER)? {
        Some(clouds) => Some(field.percentage("cloud_cover", clouds)?),
        None if granularity.requires_cloud_cover() => {
            return Err(KitewatchError::incomplete("cloud_cover", granularity));
        }
        None => None,
    };

    let pop = field.number("precipitation_probability", PRECIPITATION)?;
    let precipitation_probability_percent =
        field.percentage("precipitation_probability", scale.to_percent(pop))?;

    let description = field.description()?;

    Ok(NormalizedReading {
        timestamp,
        temperature,
        wind_speed,
        wind_direction,
        cloud_cover_percent,
        precipitation_probability_percent,
        description,
        granularity,
    })
}

struct FieldReader<'a> {
    raw: &'a RawRecord,
    granularity: Granularity,
}

impl FieldReader<'_> {
    fn lookup(&self, paths: &[&str]) -> Option<&Value> {
        paths.iter().find_map(|path| self.raw.get(path))
    }

    fn missing(&self, name: &str) -> KitewatchError {
        KitewatchError::incomplete(name, self.granularity)
    }

    fn malformed(&self, name: &str) -> KitewatchError {
        KitewatchError::incomplete(format!("{name} (unexpected value)"), self.granularity)
    }

    fn optional_number(&self, name: &str, paths: &[&str]) -> Result<Option<f64>> {
        self.lookup(paths)
            .map(|value| coerce_number(value).ok_or_else(|| self.malformed(name)))
            .transpose()
    }

    fn number(&self, name: &str, paths: &[&str]) -> Result<f64> {
        self.optional_number(name, paths)?
            .ok_or_else(|| self.missing(name))
    }

    fn percentage(&self, name: &str, value: f64) -> Result<f64> {
        if (0.0..=100.0).contains(&value) {
            Ok(value)
        } else {
            Err(self.malformed(name))
        }
    }

    fn timestamp(&self) -> Result<DateTime<Utc>> {
        let value = self.lookup(TIMESTAMP).ok_or_else(|| self.missing("timestamp"))?;
        coerce_epoch_seconds(value)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| self.malformed("timestamp"))
    }

    fn temperature(&self) -> Result<f64> {
        let value = self
            .lookup(TEMPERATURE)
            .ok_or_else(|| self.missing("temperature"))?;

        match value {
            Value::Object(parts) => parts
                .get("day")
                .and_then(coerce_number)
                .ok_or_else(|| self.missing("temperature.day")),
            scalar => coerce_number(scalar).ok_or_else(|| self.malformed("temperature")),
        }
    }

    fn description(&self) -> Result<String> {
        self.raw
            .get("weather")
            .and_then(Value::as_array)
            .and_then(|annotations| {
                annotations.iter().find_map(|annotation| {
                    annotation
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|text| !text.is_empty())
                })
            })
            .map(String::from)
            .ok_or_else(|| self.missing("weather description"))
    }
}

/// Best-effort numeric coercion: numbers and numeric strings, finite only
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Whole epoch seconds, written either as an integer or an integral float
fn coerce_epoch_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral_seconds)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse().ok().and_then(integral_seconds))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integral_seconds(secs: f64) -> Option<i64> {
    // well inside both i64 and chrono's representable range
    const LIMIT: f64 = 1e15;
    (secs.fract() == 0.0 && secs.abs() < LIMIT).then(|| secs as i64)
}
