//! Report formatter: one qualifying reading to one text block

use chrono::DateTime;
use chrono_tz::Tz;

use super::wind::{cardinal, is_angle_in_range};
use crate::config::{BonusDirection, KitewatchConfig};
use crate::models::report::LINE_BREAK;
use crate::models::{FormattedEntry, Location, NormalizedReading};

/// Appended to the wind line when the direction is a favoured one
pub const BONUS_MARKER: &str = "⭐️";

/// Renders readings in the location's local time
#[derive(Debug, Clone)]
pub struct ReportFormatter<'a> {
    bonus: &'a BonusDirection,
    timezone: Tz,
}

impl<'a> ReportFormatter<'a> {
    #[must_use]
    pub fn new(bonus: &'a BonusDirection, timezone: Tz) -> Self {
        Self { bonus, timezone }
    }

    #[must_use]
    pub fn from_config(config: &'a KitewatchConfig, location: &Location) -> Self {
        Self::new(&config.bonus, location.timezone)
    }

    /// Bonus directions only decorate the report; they never gate it
    #[must_use]
    pub fn is_bonus_direction(&self, degrees: f64) -> bool {
        is_angle_in_range(degrees, self.bonus.min_degrees, self.bonus.max_degrees)
    }

    #[must_use]
    pub fn format(&self, reading: &NormalizedReading) -> FormattedEntry {
        let when = format_timestamp(reading.timestamp.with_timezone(&self.timezone));

        let mut wind = format!(
            "Wind speed: {} mph {}",
            round_half_even(reading.wind_speed),
            cardinal(reading.wind_direction)
        );
        if self.is_bonus_direction(reading.wind_direction) {
            wind.push(' ');
            wind.push_str(BONUS_MARKER);
        }

        let conditions = format!(
            "Conditions: {}°F, {}",
            round_half_even(reading.temperature),
            title_case(&reading.description)
        );

        FormattedEntry::new([when, wind, conditions].join(LINE_BREAK))
    }
}

/// `2:00PM Saturday Jun 14`, without leading zeros on hour and day
fn format_timestamp(local: DateTime<Tz>) -> String {
    local.format("%-I:%M%p %A %b %-d").to_string()
}

#[allow(clippy::cast_possible_truncation)]
fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Upper-case the first letter of every word, lower-case the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Granularity;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn reading_at(local_hour: u32, local_minute: u32) -> NormalizedReading {
        let timestamp = Tz::America__Chicago
            .with_ymd_and_hms(2025, 6, 14, local_hour, local_minute, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        NormalizedReading {
            timestamp,
            temperature: 72.4,
            wind_speed: 15.2,
            wind_direction: 90.0,
            cloud_cover_percent: None,
            precipitation_probability_percent: 0.0,
            description: "clear sky".to_string(),
            granularity: Granularity::Daily,
        }
    }

    #[test]
    fn test_format_entry() {
        let bonus = BonusDirection::default();
        let formatter = ReportFormatter::new(&bonus, Tz::America__Chicago);

        let entry = formatter.format(&reading_at(14, 0));
        assert_eq!(
            entry.as_str(),
            "2:00PM Saturday Jun 14\r\nWind speed: 15 mph E ⭐️\r\nConditions: 72°F, Clear Sky"
        );
    }

    #[test]
    fn test_no_marker_outside_bonus_range() {
        let bonus = BonusDirection::default();
        let formatter = ReportFormatter::new(&bonus, Tz::America__Chicago);
        let mut reading = reading_at(9, 5);
        reading.wind_direction = 270.0;

        let entry = formatter.format(&reading);
        let lines: Vec<&str> = entry.as_str().split("\r\n").collect();
        assert_eq!(lines[0], "9:05AM Saturday Jun 14");
        assert_eq!(lines[1], "Wind speed: 15 mph W");
    }

    #[test]
    fn test_timestamp_is_rendered_in_location_timezone() {
        let bonus = BonusDirection::default();
        let formatter = ReportFormatter::new(&bonus, Tz::Europe__Berlin);

        // 12:00 in Chicago is 19:00 in Berlin
        let entry = formatter.format(&reading_at(12, 0));
        assert!(entry.as_str().starts_with("7:00PM Saturday Jun 14\r\n"));
    }

    #[test]
    fn test_midnight_and_noon() {
        let bonus = BonusDirection::default();
        let formatter = ReportFormatter::new(&bonus, Tz::America__Chicago);

        assert!(formatter.format(&reading_at(0, 30)).as_str().starts_with("12:30AM "));
        assert!(formatter.format(&reading_at(12, 0)).as_str().starts_with("12:00PM "));
    }

    #[rstest]
    #[case(44.9, false)]
    #[case(45.0, true)]
    #[case(180.0, true)]
    #[case(180.1, false)]
    fn test_bonus_range_is_inclusive(#[case] degrees: f64, #[case] expected: bool) {
        let bonus = BonusDirection::default();
        let formatter = ReportFormatter::new(&bonus, Tz::UTC);
        assert_eq!(formatter.is_bonus_direction(degrees), expected);
    }

    #[rstest]
    #[case(14.5, 14)]
    #[case(15.5, 16)]
    #[case(15.49, 15)]
    #[case(-0.4, 0)]
    fn test_round_half_even(#[case] value: f64, #[case] expected: i64) {
        assert_eq!(round_half_even(value), expected);
    }

    #[rstest]
    #[case("clear sky", "Clear Sky")]
    #[case("LIGHT RAIN", "Light Rain")]
    #[case("few clouds: 11-25%", "Few Clouds: 11-25%")]
    #[case("", "")]
    fn test_title_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(title_case(input), expected);
    }
}
