//! Gating rules for a normalized reading
//!
//! A reading is reported only when every rule holds. The evaluator is a
//! pure function of the reading and the configuration; the activity window
//! depends on the reading's own timestamp, never on the current time.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt;
use tracing::debug;

use crate::config::{ActivityWindow, ConditionCriteria, KitewatchConfig};
use crate::models::{Location, NormalizedReading};
use crate::weather;

/// The predicates a reading has to pass, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatingRule {
    ActivityWindow,
    CloudCover,
    Precipitation,
    Temperature,
    WindSpeed,
    DescriptionExclusion,
}

impl GatingRule {
    pub const ALL: [GatingRule; 6] = [
        GatingRule::ActivityWindow,
        GatingRule::CloudCover,
        GatingRule::Precipitation,
        GatingRule::Temperature,
        GatingRule::WindSpeed,
        GatingRule::DescriptionExclusion,
    ];
}

impl fmt::Display for GatingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatingRule::ActivityWindow => write!(f, "activity window"),
            GatingRule::CloudCover => write!(f, "cloud cover"),
            GatingRule::Precipitation => write!(f, "precipitation"),
            GatingRule::Temperature => write!(f, "temperature"),
            GatingRule::WindSpeed => write!(f, "wind speed"),
            GatingRule::DescriptionExclusion => write!(f, "description exclusion"),
        }
    }
}

/// Applies the configured gating rules to readings for one location
#[derive(Debug, Clone)]
pub struct RuleEvaluator<'a> {
    criteria: &'a ConditionCriteria,
    window: &'a ActivityWindow,
    location: &'a Location,
}

impl<'a> RuleEvaluator<'a> {
    #[must_use]
    pub fn new(
        criteria: &'a ConditionCriteria,
        window: &'a ActivityWindow,
        location: &'a Location,
    ) -> Self {
        Self {
            criteria,
            window,
            location,
        }
    }

    #[must_use]
    pub fn from_config(config: &'a KitewatchConfig, location: &'a Location) -> Self {
        Self::new(&config.criteria, &config.window, location)
    }

    /// True when the reading passes every gating rule
    #[must_use]
    pub fn evaluate(&self, reading: &NormalizedReading) -> bool {
        self.rejection(reading).is_none()
    }

    /// First rule the reading fails, if any
    #[must_use]
    pub fn rejection(&self, reading: &NormalizedReading) -> Option<GatingRule> {
        GatingRule::ALL
            .into_iter()
            .find(|rule| !self.holds(*rule, reading))
    }

    #[must_use]
    pub fn holds(&self, rule: GatingRule, reading: &NormalizedReading) -> bool {
        let criteria = self.criteria;
        match rule {
            GatingRule::ActivityWindow => self.in_activity_window(reading.timestamp),
            // daily aggregates may not carry cloud cover at all
            GatingRule::CloudCover => reading
                .cloud_cover_percent
                .is_none_or(|clouds| clouds < criteria.max_cloud_cover),
            GatingRule::Precipitation => {
                reading.precipitation_probability_percent < criteria.max_precipitation_probability
            }
            GatingRule::Temperature => {
                (criteria.min_temperature..=criteria.max_temperature).contains(&reading.temperature)
            }
            GatingRule::WindSpeed => {
                reading.wind_speed >= criteria.min_wind_speed
                    && criteria
                        .max_wind_speed
                        .is_none_or(|max| reading.wind_speed <= max)
            }
            GatingRule::DescriptionExclusion => {
                let description = reading.description.to_lowercase();
                !criteria
                    .excluded_descriptions
                    .iter()
                    .any(|term| description.contains(&term.to_lowercase()))
            }
        }
    }

    /// Weekend days inside the daytime hours, or other days from the
    /// evening start hour until the end of daylight.
    fn in_activity_window(&self, timestamp: DateTime<Utc>) -> bool {
        let local = self.location.local_time(timestamp);
        let hour = local.hour();
        let window = self.window;

        if window.weekend_days.contains(&local.weekday()) {
            return (window.start_hour..=window.end_hour).contains(&hour);
        }

        if !window.weekday_evenings || hour < window.evening_start_hour {
            return false;
        }

        let date = self.location.local_date(timestamp);
        match weather::daylight_until(self.location, date) {
            Some(until) => timestamp <= until,
            None => {
                debug!(%date, "No daylight evening at location, window closed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Granularity;
    use chrono::TimeZone;
    use chrono_tz::Tz;
    use rstest::{fixture, rstest};

    #[fixture]
    fn chicago() -> Location {
        Location::new(41.88, -87.63, "Chicago".to_string(), Tz::America__Chicago)
    }

    fn at_local(location: &Location, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        location
            .timezone
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Passes every rule with the default configuration (Saturday noon)
    fn good_reading(location: &Location) -> NormalizedReading {
        NormalizedReading {
            timestamp: at_local(location, 2025, 6, 14, 12, 0),
            temperature: 72.0,
            wind_speed: 15.0,
            wind_direction: 90.0,
            cloud_cover_percent: Some(20.0),
            precipitation_probability_percent: 5.0,
            description: "clear sky".to_string(),
            granularity: Granularity::Hourly,
        }
    }

    #[rstest]
    fn test_good_reading_passes(chicago: Location) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let reading = good_reading(&chicago);

        assert!(evaluator.evaluate(&reading));
        assert_eq!(evaluator.rejection(&reading), None);
    }

    #[rstest]
    fn test_low_wind_fails_regardless_of_other_fields(chicago: Location) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        reading.wind_speed = 3.0;

        assert!(!evaluator.evaluate(&reading));
        assert_eq!(evaluator.rejection(&reading), Some(GatingRule::WindSpeed));
    }

    #[rstest]
    fn test_description_gate_is_independent_of_precipitation(chicago: Location) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        reading.description = "light rain".to_string();
        reading.precipitation_probability_percent = 10.0;

        assert!(evaluator.holds(GatingRule::Precipitation, &reading));
        assert_eq!(
            evaluator.rejection(&reading),
            Some(GatingRule::DescriptionExclusion)
        );
    }

    #[rstest]
    fn test_description_match_ignores_case(chicago: Location) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        reading.description = "Moderate RAIN".to_string();

        assert!(!evaluator.holds(GatingRule::DescriptionExclusion, &reading));
    }

    #[rstest]
    #[case::cloud_cover_at_limit(|r: &mut NormalizedReading| r.cloud_cover_percent = Some(85.0), GatingRule::CloudCover)]
    #[case::precipitation_at_limit(|r: &mut NormalizedReading| r.precipitation_probability_percent = 25.0, GatingRule::Precipitation)]
    #[case::too_cold(|r: &mut NormalizedReading| r.temperature = 44.9, GatingRule::Temperature)]
    #[case::too_hot(|r: &mut NormalizedReading| r.temperature = 95.1, GatingRule::Temperature)]
    #[case::too_windy(|r: &mut NormalizedReading| r.wind_speed = 20.5, GatingRule::WindSpeed)]
    fn test_threshold_rejections(
        chicago: Location,
        #[case] mutate: fn(&mut NormalizedReading),
        #[case] expected: GatingRule,
    ) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        mutate(&mut reading);

        assert_eq!(evaluator.rejection(&reading), Some(expected));
    }

    #[rstest]
    #[case::min_temperature(|r: &mut NormalizedReading| r.temperature = 45.0)]
    #[case::max_temperature(|r: &mut NormalizedReading| r.temperature = 95.0)]
    #[case::min_wind(|r: &mut NormalizedReading| r.wind_speed = 8.0)]
    #[case::max_wind(|r: &mut NormalizedReading| r.wind_speed = 20.0)]
    #[case::cloud_cover_missing(|r: &mut NormalizedReading| r.cloud_cover_percent = None)]
    fn test_inclusive_bounds_pass(chicago: Location, #[case] mutate: fn(&mut NormalizedReading)) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        mutate(&mut reading);

        assert!(evaluator.evaluate(&reading));
    }

    #[rstest]
    fn test_no_upper_wind_limit(chicago: Location) {
        let mut config = KitewatchConfig::default();
        config.criteria.max_wind_speed = None;
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        reading.wind_speed = 35.0;

        assert!(evaluator.evaluate(&reading));
    }

    #[rstest]
    // Saturday, inclusive daytime bounds
    #[case(2025, 6, 14, 10, 0, true)]
    #[case(2025, 6, 14, 18, 30, true)]
    #[case(2025, 6, 14, 9, 59, false)]
    #[case(2025, 6, 14, 19, 0, false)]
    // Sunday
    #[case(2025, 6, 15, 13, 0, true)]
    // Wednesday: only evenings until sunset (about 20:28 CDT)
    #[case(2025, 6, 11, 12, 0, false)]
    #[case(2025, 6, 11, 17, 0, true)]
    #[case(2025, 6, 11, 20, 0, true)]
    #[case(2025, 6, 11, 21, 0, false)]
    // Wednesday in December: sunset before 17:00
    #[case(2025, 12, 10, 17, 0, false)]
    fn test_activity_window_uses_local_time(
        chicago: Location,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] expected: bool,
    ) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        reading.timestamp = at_local(&chicago, year, month, day, hour, minute);

        assert_eq!(evaluator.holds(GatingRule::ActivityWindow, &reading), expected);
    }

    #[rstest]
    // Midnight sun: weekday evenings run until local midnight
    #[case(2025, 6, 18, 23, 30, true)]
    // Polar night: no daylight evening at all
    #[case(2025, 12, 17, 17, 0, false)]
    fn test_activity_window_above_arctic_circle(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] expected: bool,
    ) {
        let tromso = Location::new(69.65, 18.96, "Tromsø".to_string(), Tz::Europe__Oslo);
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &tromso);
        let mut reading = good_reading(&tromso);
        reading.timestamp = at_local(&tromso, year, month, day, hour, minute);

        assert_eq!(evaluator.holds(GatingRule::ActivityWindow, &reading), expected);
    }

    #[rstest]
    fn test_weekday_evenings_can_be_disabled(chicago: Location) {
        let mut config = KitewatchConfig::default();
        config.window.weekday_evenings = false;
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        reading.timestamp = at_local(&chicago, 2025, 6, 11, 18, 0);

        assert!(!evaluator.holds(GatingRule::ActivityWindow, &reading));
    }

    #[rstest]
    fn test_window_is_not_evaluated_in_utc(chicago: Location) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let mut reading = good_reading(&chicago);
        // 16:00 UTC Saturday is 11:00 in Chicago; 23:00 UTC is 18:00
        reading.timestamp = Utc.with_ymd_and_hms(2025, 6, 14, 23, 0, 0).unwrap();
        assert!(evaluator.holds(GatingRule::ActivityWindow, &reading));
        // 02:00 UTC Sunday is still Saturday 21:00 in Chicago
        reading.timestamp = Utc.with_ymd_and_hms(2025, 6, 15, 2, 0, 0).unwrap();
        assert!(!evaluator.holds(GatingRule::ActivityWindow, &reading));
    }

    #[rstest]
    fn test_parallel_evaluation_matches_sequential(chicago: Location) {
        let config = KitewatchConfig::default();
        let evaluator = RuleEvaluator::from_config(&config, &chicago);
        let readings: Vec<NormalizedReading> = (0..48)
            .map(|i| {
                let mut reading = good_reading(&chicago);
                reading.timestamp += chrono::Duration::hours(i);
                reading.wind_speed = 6.0 + f64::from(i32::try_from(i % 10).unwrap());
                reading
            })
            .collect();

        let evaluator = &evaluator;
        let sequential: Vec<bool> = readings.iter().map(|r| evaluator.evaluate(r)).collect();
        let parallel: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = readings
                .iter()
                .map(|r| scope.spawn(move || evaluator.evaluate(r)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, parallel);
        assert!(sequential.iter().any(|v| *v));
        assert!(sequential.iter().any(|v| !*v));
    }
}
