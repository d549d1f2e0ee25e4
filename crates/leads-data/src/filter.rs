//! Inclusive calendar-date range filtering for any date-bearing record.

use chrono::NaiveDate;
use serde::Serialize;

use leads_core::models::{ContractRecord, DailyAggregate, RawRecord};
use leads_core::time_utils::{parse_date, sort_by_date};
use leads_core::{LeadsError, Result};

/// A record keyed by a date cell.
pub trait Dated {
    fn date(&self) -> &str;
}

impl Dated for RawRecord {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for ContractRecord {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for DailyAggregate {
    fn date(&self) -> &str {
        &self.date
    }
}

/// Stable chronological sort of any dated records.
pub fn sort_records<T: Dated>(records: &mut [T]) {
    sort_by_date(records, |r| r.date());
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive `[start, end]` calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Build a range from optional caller-supplied bounds.
    ///
    /// Every bound that is given must parse. When either bound is missing the
    /// result is `None`, meaning "no filtering".
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>> {
        let start = start.map(parse_bound).transpose()?;
        let end = end.map(parse_bound).transpose()?;
        Ok(match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            _ => None,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_bound(bound: &str) -> Result<NaiveDate> {
    parse_date(bound).ok_or_else(|| LeadsError::InvalidDateBound(bound.to_string()))
}

// ── Filtering ─────────────────────────────────────────────────────────────────

/// Records whose date falls in `range`, in their original order.
///
/// `None` keeps everything. Records whose own date does not parse are
/// excluded from a bounded result.
pub fn filter_by_range<T: Dated + Clone>(records: &[T], range: Option<&DateRange>) -> Vec<T> {
    match range {
        None => records.to_vec(),
        Some(range) => records
            .iter()
            .filter(|r| parse_date(r.date()).is_some_and(|d| range.contains(d)))
            .cloned()
            .collect(),
    }
}

/// Parse `start`/`end` and filter `records` by them.
///
/// Either bound missing returns the input unchanged; a bound that is not a
/// date is an [`LeadsError::InvalidDateBound`] error.
pub fn range_filter<T: Dated + Clone>(
    records: &[T],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<T>> {
    let range = DateRange::from_bounds(start, end)?;
    Ok(filter_by_range(records, range.as_ref()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
