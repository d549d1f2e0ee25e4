//! Per-metric time series handed to the charting collaborator.

use serde::Serialize;

use leads_core::models::{DailyAggregate, Metric};

/// One metric over time: parallel `dates` / `values` vectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub metric: Metric,
    /// Legend label (the column name).
    pub name: String,
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

impl MetricSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Series of `metric` across `days`, in the order given.
pub fn metric_series(days: &[DailyAggregate], metric: Metric) -> MetricSeries {
    MetricSeries {
        metric,
        name: metric.column().to_string(),
        dates: days.iter().map(|d| d.date.clone()).collect(),
        values: days.iter().map(|d| d.metrics.get(metric)).collect(),
    }
}

/// One series per selected metric, keeping selection order.
pub fn combined_series(days: &[DailyAggregate], metrics: &[Metric]) -> Vec<MetricSeries> {
    metrics.iter().map(|&m| metric_series(days, m)).collect()
}

/// Daily cost, charted on its own axis.
pub fn cost_series(days: &[DailyAggregate]) -> MetricSeries {
    metric_series(days, Metric::Cost)
}
