//! Data models for kitewatch

pub mod forecast;
pub mod location;
pub mod raw;
pub mod reading;
pub mod report;

pub use forecast::Forecast;
pub use location::Location;
pub use raw::RawRecord;
pub use reading::{Granularity, NormalizedReading};
pub use report::{FormattedEntry, Report};
