//! Daily aggregation and pipeline-stage totals over event records.

use std::collections::HashMap;

use leads_core::models::{DailyAggregate, LeadMetrics, PipelineStage, PipelineStageTotal, RawRecord};
use leads_core::time_utils::date_sort_key;

// ── DailyTotals ───────────────────────────────────────────────────────────────

/// Metric totals accumulated across days, plus the number of rows behind them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyTotals {
    pub metrics: LeadMetrics,
    pub rows: u32,
    pub days: usize,
}

// ── DailyAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that folds event rows into per-day views.
pub struct DailyAggregator;

impl DailyAggregator {
    /// Sum every metric of the records sharing a date string.
    ///
    /// Dates are grouped by exact text, so `"2024-01-05"` and `"1/5/2024"` stay
    /// separate days. The result is in ascending calendar order; dates that do
    /// not parse come last.
    pub fn aggregate_by_date(records: &[RawRecord]) -> Vec<DailyAggregate> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut days: Vec<DailyAggregate> = Vec::new();

        for record in records {
            let slot = *index.entry(record.date.as_str()).or_insert_with(|| {
                days.push(DailyAggregate {
                    date: record.date.clone(),
                    metrics: LeadMetrics::default(),
                    rows: 0,
                });
                days.len() - 1
            });
            let day = &mut days[slot];
            day.metrics.accumulate(&record.metrics);
            day.rows += 1;
        }

        days.sort_by_cached_key(|day| (date_sort_key(&day.date), day.date.clone()));
        days
    }

    /// Funnel totals across all days, in fixed stage order.
    pub fn pipeline_totals(aggregates: &[DailyAggregate]) -> Vec<PipelineStageTotal> {
        PipelineStage::ALL
            .into_iter()
            .map(|stage| PipelineStageTotal {
                stage,
                label: stage.label().to_string(),
                total: aggregates
                    .iter()
                    .map(|day| day.metrics.get(stage.metric()))
                    .sum(),
            })
            .collect()
    }

    /// Sum every metric and row count across all days.
    pub fn calculate_totals(aggregates: &[DailyAggregate]) -> DailyTotals {
        let mut totals = DailyTotals {
            days: aggregates.len(),
            ..Default::default()
        };
        for day in aggregates {
            totals.metrics.accumulate(&day.metrics);
            totals.rows += day.rows;
        }
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
