//! Weather forecast as fetched for one location

use super::{Location, RawRecord};

/// Raw hourly and daily records for one location
#[derive(Debug, Clone)]
pub struct Forecast {
    /// Location for this forecast
    pub location: Location,
    /// Hourly records in source order
    pub hourly: Vec<RawRecord>,
    /// Daily aggregates in source order
    pub daily: Vec<RawRecord>,
}

impl Forecast {
    /// Create new forecast
    #[must_use]
    pub fn new(location: Location, hourly: Vec<RawRecord>, daily: Vec<RawRecord>) -> Self {
        Self {
            location,
            hourly,
            daily,
        }
    }

    /// Number of records across both granularities
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.hourly.len() + self.daily.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;
    use serde_json::json;

    #[test]
    fn test_record_count() {
        let location = Location::new(41.88, -87.63, "Chicago".to_string(), Tz::America__Chicago);
        let forecast = Forecast::new(
            location.clone(),
            vec![RawRecord::new(json!({"dt": 1})), RawRecord::new(json!({"dt": 2}))],
            vec![RawRecord::new(json!({"dt": 3}))],
        );
        assert_eq!(forecast.record_count(), 3);
        assert!(!forecast.is_empty());

        let empty = Forecast::new(location, Vec::new(), Vec::new());
        assert!(empty.is_empty());
    }
}
