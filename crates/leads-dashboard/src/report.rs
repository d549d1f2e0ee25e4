//! Rendering a dashboard view as a text table, JSON or CSV.

use std::str::FromStr;

use anyhow::{anyhow, Result};

use leads_core::formatting::{format_currency, format_metric, format_number};
use leads_core::models::{CompanyRegistry, Metric};
use leads_data::aggregator::DailyAggregator;
use leads_data::series::{combined_series, cost_series, MetricSeries};
use leads_data::tokenizer::join_fields;
use leads_runtime::pipeline::DashboardView;

// ── Selectors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Raw,
    Daily,
    Pipeline,
    Contracts,
    Companies,
    Series,
}

impl FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raw" => Ok(View::Raw),
            "daily" => Ok(View::Daily),
            "pipeline" => Ok(View::Pipeline),
            "contracts" => Ok(View::Contracts),
            "companies" => Ok(View::Companies),
            "series" => Ok(View::Series),
            other => Err(anyhow!("Unknown view: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(anyhow!("Unknown format: {}", other)),
        }
    }
}

/// Metrics for the series view: a comma-separated list, or every charted
/// metric plus cost when `None`.
pub fn parse_metrics(arg: Option<&str>) -> Result<Vec<Metric>> {
    let Some(arg) = arg else {
        let mut all = Metric::CHARTED.to_vec();
        all.push(Metric::Cost);
        return Ok(all);
    };
    arg.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| Metric::from_str(s).map_err(|e| anyhow!(e)))
        .collect()
}

// ── Table model ───────────────────────────────────────────────────────────────

/// Rows of cells shared by the table and CSV renderers.
#[derive(Debug, Clone, Default, PartialEq)]
struct Grid {
    title: String,
    headers: Vec<String>,
    right_aligned: Vec<bool>,
    rows: Vec<Vec<String>>,
    footer: Option<Vec<String>>,
}

impl Grid {
    fn new(title: &str, columns: &[(&str, bool)]) -> Self {
        Self {
            title: title.to_string(),
            headers: columns.iter().map(|(h, _)| h.to_string()).collect(),
            right_aligned: columns.iter().map(|(_, r)| *r).collect(),
            ..Default::default()
        }
    }
}

/// Cell text for a metric value. Tables group thousands; CSV keeps plain numbers.
fn metric_cell(metric: Metric, value: f64, styled: bool) -> String {
    match (styled, metric) {
        (false, _) => value.to_string(),
        (true, Metric::Cost) => format_currency(value),
        (true, m) => format_metric(m, value),
    }
}

fn metric_columns() -> Vec<(&'static str, bool)> {
    Metric::ALL.iter().map(|m| (m.column(), true)).collect()
}

fn build_grid(
    view: &DashboardView,
    companies: &CompanyRegistry,
    kind: View,
    series: &[MetricSeries],
    styled: bool,
) -> Grid {
    match kind {
        View::Raw => {
            let mut columns = vec![("Date", false)];
            columns.extend(metric_columns());
            columns.push(("Company Name", false));
            let mut grid = Grid::new("Raw Data", &columns);
            for record in &view.raw {
                let mut row = vec![record.date.clone()];
                row.extend(
                    Metric::ALL
                        .iter()
                        .map(|&m| metric_cell(m, record.metrics.get(m), styled)),
                );
                row.push(record.company.as_str().to_string());
                grid.rows.push(row);
            }
            grid
        }
        View::Daily => {
            let mut columns = vec![("Date", false)];
            columns.extend(metric_columns());
            columns.push(("Rows", true));
            let mut grid = Grid::new("Daily Totals", &columns);
            for day in &view.daily {
                let mut row = vec![day.date.clone()];
                row.extend(
                    Metric::ALL
                        .iter()
                        .map(|&m| metric_cell(m, day.metrics.get(m), styled)),
                );
                row.push(day.rows.to_string());
                grid.rows.push(row);
            }
            if styled && !view.daily.is_empty() {
                let totals = DailyAggregator::calculate_totals(&view.daily);
                let mut footer = vec![format!("Total ({} days)", totals.days)];
                footer.extend(
                    Metric::ALL
                        .iter()
                        .map(|&m| metric_cell(m, totals.metrics.get(m), styled)),
                );
                footer.push(totals.rows.to_string());
                grid.footer = Some(footer);
            }
            grid
        }
        View::Pipeline => {
            let mut grid = Grid::new("Lead Pipeline", &[("Stage", false), ("Total", true)]);
            for stage in &view.stages {
                let total = if styled {
                    format_number(stage.total, 0)
                } else {
                    stage.total.to_string()
                };
                grid.rows.push(vec![stage.label.clone(), total]);
            }
            grid
        }
        View::Contracts => {
            let mut grid = Grid::new(
                "Qualified Contracts",
                &[
                    ("Date", false),
                    ("Lead Name", false),
                    ("Company Name", false),
                    ("Service Type", false),
                    ("Contract Date", false),
                ],
            );
            for contract in &view.contracts {
                grid.rows.push(vec![
                    contract.date.clone(),
                    contract.lead_name.clone(),
                    contract.company.as_str().to_string(),
                    contract.service_type.clone(),
                    contract.contract_date.clone(),
                ]);
            }
            grid
        }
        View::Companies => {
            let mut grid = Grid::new("Companies", &[("Company Name", false)]);
            grid.rows = companies.iter().map(|c| vec![c.to_string()]).collect();
            grid
        }
        View::Series => {
            let mut columns = vec![("Date", false)];
            columns.extend(series.iter().map(|s| (s.name.as_str(), true)));
            let mut grid = Grid::new("Daily Series", &columns);
            let dates = series.first().map(|s| s.dates.as_slice()).unwrap_or_default();
            for (i, date) in dates.iter().enumerate() {
                let mut row = vec![date.clone()];
                row.extend(
                    series
                        .iter()
                        .map(|s| metric_cell(s.metric, s.values[i], styled)),
                );
                grid.rows.push(row);
            }
            grid
        }
    }
}

// ── Renderers ─────────────────────────────────────────────────────────────────

fn render_table(grid: &Grid) -> String {
    if grid.rows.is_empty() {
        return format!("{}\n\nNo data for the selected range.\n", grid.title);
    }

    let mut widths: Vec<usize> = grid.headers.iter().map(|h| h.chars().count()).collect();
    for row in grid.rows.iter().chain(grid.footer.iter()) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .zip(&grid.right_aligned)
            .map(|((cell, &w), &right)| {
                if right {
                    format!("{:>w$}", cell, w = w)
                } else {
                    format!("{:<w$}", cell, w = w)
                }
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    };
    let rule = widths
        .iter()
        .map(|&w| "─".repeat(w))
        .collect::<Vec<_>>()
        .join("  ");

    let mut out = format!("{}\n\n{}\n{}\n", grid.title, line(&grid.headers), rule);
    for row in &grid.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    if let Some(footer) = &grid.footer {
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&line(footer));
        out.push('\n');
    }
    out
}

fn render_csv(grid: &Grid) -> String {
    let mut out = join_fields(&grid.headers);
    out.push('\n');
    for row in &grid.rows {
        out.push_str(&join_fields(row));
        out.push('\n');
    }
    out
}

fn render_json(
    view: &DashboardView,
    companies: &CompanyRegistry,
    kind: View,
    series: &[MetricSeries],
) -> Result<String> {
    let json = match kind {
        View::Raw => serde_json::to_string_pretty(&view.raw)?,
        View::Daily => serde_json::to_string_pretty(&view.daily)?,
        View::Pipeline => serde_json::to_string_pretty(&view.stages)?,
        View::Contracts => serde_json::to_string_pretty(&view.contracts)?,
        View::Companies => serde_json::to_string_pretty(&companies.iter().collect::<Vec<_>>())?,
        View::Series => serde_json::to_string_pretty(series)?,
    };
    Ok(json + "\n")
}

/// Render `kind` of `view` in `format`. `metrics` only affects the series view.
pub fn render(
    view: &DashboardView,
    companies: &CompanyRegistry,
    kind: View,
    format: OutputFormat,
    metrics: &[Metric],
) -> Result<String> {
    let series = if kind == View::Series {
        series_for(view, metrics)
    } else {
        Vec::new()
    };

    match format {
        OutputFormat::Json => render_json(view, companies, kind, &series),
        OutputFormat::Table => Ok(render_table(&build_grid(view, companies, kind, &series, true))),
        OutputFormat::Csv => Ok(render_csv(&build_grid(view, companies, kind, &series, false))),
    }
}

/// Cost is charted on its own axis, so it is split out and appended last.
fn series_for(view: &DashboardView, metrics: &[Metric]) -> Vec<MetricSeries> {
    let charted: Vec<Metric> = metrics
        .iter()
        .copied()
        .filter(|&m| m != Metric::Cost)
        .collect();
    let mut series = combined_series(&view.daily, &charted);
    if metrics.contains(&Metric::Cost) {
        series.push(cost_series(&view.daily));
    }
    series
}

// ── Tests ─────────────────────────────────────────────────────────────────────
