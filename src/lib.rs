//! `Kitewatch` - checks the local forecast for kiting windows
//!
//! This library fetches an hourly and daily forecast for one location,
//! keeps the readings that fall in the activity window and satisfy the
//! configured conditions, and renders them into a plain-text report.

pub mod conditions;
pub mod config;
pub mod email;
pub mod error;
pub mod logging;
pub mod models;
pub mod weather;

// Re-export core types for public API
pub use conditions::{GatingRule, Pipeline, ReportFormatter, RuleEvaluator, RunSummary};
pub use config::KitewatchConfig;
pub use email::{EmailNotifier, Notifier, StdoutNotifier};
pub use error::KitewatchError;
pub use models::{Forecast, FormattedEntry, Location, NormalizedReading, RawRecord, Report};
pub use weather::{ForecastSource, OpenWeatherClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, KitewatchError>;
