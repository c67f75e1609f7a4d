//! Raw forecast records as delivered by the forecast service

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One untyped forecast record.
///
/// Hourly and daily records, and different API versions, disagree on field
/// names and nesting. The record is therefore kept as plain JSON and only
/// interpreted by [`crate::conditions::normalize`], so a single odd record
/// can be rejected without failing the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Value);

impl RawRecord {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a field, following a dotted path into nested objects
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.0, |value, key| value.get(key))
            .filter(|value| !value.is_null())
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_follows_nested_path() {
        let record = RawRecord::new(json!({"main": {"temp": 71.2}, "pop": 0.1}));
        assert_eq!(record.get("main.temp"), Some(&json!(71.2)));
        assert_eq!(record.get("pop"), Some(&json!(0.1)));
        assert_eq!(record.get("main.humidity"), None);
        assert_eq!(record.get("pop.value"), None);
    }

    #[test]
    fn test_null_is_treated_as_absent() {
        let record = RawRecord::new(json!({"clouds": null}));
        assert_eq!(record.get("clouds"), None);
    }
}
