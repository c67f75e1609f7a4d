//! Pipeline orchestrator: raw records in, optional report out

use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::format::ReportFormatter;
use super::normalize::{PrecipitationScale, normalize};
use super::rules::RuleEvaluator;
use crate::config::KitewatchConfig;
use crate::models::{Forecast, FormattedEntry, Granularity, Location, RawRecord, Report};

/// Per-run counters, only used for logging
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub incomplete: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub reported: usize,
}

/// Evaluates one location's forecast against the configured rules
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    evaluator: RuleEvaluator<'a>,
    formatter: ReportFormatter<'a>,
    precipitation_scale: PrecipitationScale,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(config: &'a KitewatchConfig, location: &'a Location) -> Self {
        Self {
            evaluator: RuleEvaluator::from_config(config, location),
            formatter: ReportFormatter::from_config(config, location),
            precipitation_scale: config.forecast.precipitation_scale,
        }
    }

    /// Run the pipeline over a fetched forecast
    #[must_use]
    pub fn run_forecast(&self, forecast: &Forecast) -> Option<Report> {
        self.run(&forecast.hourly, &forecast.daily)
    }

    /// Format every qualifying record, hourly first, dropping entries whose
    /// text is already present. `None` when nothing qualifies.
    #[must_use]
    pub fn run(&self, hourly: &[RawRecord], daily: &[RawRecord]) -> Option<Report> {
        let (entries, summary) = self.collect(hourly, daily);

        if summary.records == 0 {
            info!("Forecast contained no records, nothing to evaluate");
        } else if entries.is_empty() {
            info!(
                records = summary.records,
                incomplete = summary.incomplete,
                rejected = summary.rejected,
                "No qualifying conditions"
            );
        } else {
            info!(
                records = summary.records,
                incomplete = summary.incomplete,
                rejected = summary.rejected,
                duplicates = summary.duplicates,
                reported = summary.reported,
                "Found qualifying conditions"
            );
        }

        Report::from_entries(entries)
    }

    /// Deduplicated entries in source order, with counters
    #[must_use]
    pub fn collect(
        &self,
        hourly: &[RawRecord],
        daily: &[RawRecord],
    ) -> (Vec<FormattedEntry>, RunSummary) {
        let mut summary = RunSummary::default();
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        let records = hourly
            .iter()
            .map(|raw| (raw, Granularity::Hourly))
            .chain(daily.iter().map(|raw| (raw, Granularity::Daily)));

        for (index, (raw, granularity)) in records.enumerate() {
            summary.records += 1;
            let Some(entry) = self.assess(index, raw, granularity, &mut summary) else {
                continue;
            };

            if seen.insert(entry.clone()) {
                entries.push(entry);
                summary.reported += 1;
            } else {
                debug!(index, %granularity, "Dropping duplicate entry");
                summary.duplicates += 1;
            }
        }

        (entries, summary)
    }

    fn assess(
        &self,
        index: usize,
        raw: &RawRecord,
        granularity: Granularity,
        summary: &mut RunSummary,
    ) -> Option<FormattedEntry> {
        let reading = match normalize(raw, granularity, self.precipitation_scale) {
            Ok(reading) => reading,
            Err(e) => {
                warn!(index, %granularity, "Skipping record: {}", e);
                summary.incomplete += 1;
                return None;
            }
        };

        if let Some(rule) = self.evaluator.rejection(&reading) {
            debug!(index, %granularity, timestamp = %reading.timestamp, %rule, "Rejected");
            summary.rejected += 1;
            return None;
        }

        Some(self.formatter.format(&reading))
    }
}
