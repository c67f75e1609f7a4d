//! Condition evaluation and report composition
//!
//! This module provides the pure core of kitewatch:
//! - Normalization of hourly and daily forecast records into one reading type
//! - Gating rules deciding whether a reading is worth reporting
//! - Formatting of qualifying readings into report entries
//! - The pipeline tying these together with deduplication

pub mod format;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod wind;

pub use format::{BONUS_MARKER, ReportFormatter};
pub use normalize::{PrecipitationScale, normalize};
pub use pipeline::{Pipeline, RunSummary};
pub use rules::{GatingRule, RuleEvaluator};
pub use wind::cardinal;
