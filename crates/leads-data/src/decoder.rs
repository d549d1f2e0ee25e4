//! Header-driven decoding of tokenized rows into typed records.

use leads_core::models::{CompanyNames, ContractRecord, LeadMetrics, Metric, RawRecord, NOT_AVAILABLE};
use leads_core::{LeadsError, Result};

// ── Column names ──────────────────────────────────────────────────────────────

pub const DATE_COLUMN: &str = "Date";
pub const COMPANY_COLUMN: &str = "Company Name";
pub const LEAD_NAME_COLUMN: &str = "Lead Name";
pub const SERVICE_TYPE_COLUMN: &str = "Service Type";
pub const CONTRACT_DATE_COLUMN: &str = "Contract Date";

/// `true` for the columns coerced to numbers.
pub fn is_numeric_column(column: &str) -> bool {
    Metric::from_column(column).is_some()
}

// ── Numeric coercion ──────────────────────────────────────────────────────────

/// How a numeric cell turned into its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// The whole cell is a number.
    Exact,
    /// The cell starts with a number followed by other text; the prefix is used.
    Prefix,
    /// Empty cell, read as 0.
    Blank,
    /// No number at all, read as 0.
    Fallback,
}

/// Coerce a numeric cell. Never fails: blank and unparseable cells are 0.
pub fn coerce_number(cell: &str) -> (f64, Coercion) {
    let cell = cell.trim();
    if cell.is_empty() {
        return (0.0, Coercion::Blank);
    }
    match leading_number(cell, true) {
        Some((value, consumed)) if consumed == cell.len() => (value, Coercion::Exact),
        Some((value, _)) => (value, Coercion::Prefix),
        None => (0.0, Coercion::Fallback),
    }
}

/// Parse the longest decimal number at the start of `s` (after whitespace).
pub fn leading_float(s: &str) -> Option<f64> {
    leading_number(s.trim_start(), true).map(|(value, _)| value)
}

/// Parse the integer at the start of `s`, ignoring any fraction after it.
pub fn leading_integer(s: &str) -> Option<f64> {
    leading_number(s.trim_start(), false).map(|(value, _)| value)
}

/// Scan `[+-]digits[.digits][e[+-]digits]` and return the value with the
/// number of bytes consumed. At least one mantissa digit is required.
fn leading_number(s: &str, allow_fraction: bool) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if allow_fraction && bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    if allow_fraction && matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+') | Some(b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    let value: f64 = s[..end].parse().ok()?;
    value.is_finite().then_some((value, end))
}

// ── Decoded rows ──────────────────────────────────────────────────────────────

/// A cell after per-column coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// One data line mapped onto the header.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    columns: Vec<(String, FieldValue)>,
    /// Numeric cells that were empty.
    pub blank_cells: usize,
    /// Numeric cells whose trailing text was ignored.
    pub prefix_cells: usize,
    /// Numeric cells that held no number.
    pub fallback_cells: usize,
}

impl DecodedRow {
    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Numeric value of `column`; 0 when the column is absent.
    pub fn number(&self, column: &str) -> f64 {
        match self.get(column) {
            Some(FieldValue::Number(n)) => *n,
            _ => 0.0,
        }
    }

    /// Text of `column`, if present.
    pub fn text(&self, column: &str) -> Option<&str> {
        match self.get(column) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Column name/value pairs in header order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

// ── RecordDecoder ─────────────────────────────────────────────────────────────

/// Decodes data lines against a fixed header.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    header: Vec<String>,
}

impl RecordDecoder {
    /// `header` must already be tokenized and trimmed.
    pub fn new(header: Vec<String>) -> Self {
        Self { header }
    }

    /// Map `fields` onto the header, coercing numeric columns.
    ///
    /// Fails only when the field count differs from the header's.
    pub fn decode(&self, fields: Vec<String>) -> Result<DecodedRow> {
        if fields.len() != self.header.len() {
            return Err(LeadsError::RowShape {
                expected: self.header.len(),
                found: fields.len(),
            });
        }

        let mut row = DecodedRow {
            columns: Vec::with_capacity(fields.len()),
            blank_cells: 0,
            prefix_cells: 0,
            fallback_cells: 0,
        };

        for (name, cell) in self.header.iter().zip(fields) {
            let value = if is_numeric_column(name) {
                let (value, coercion) = coerce_number(&cell);
                match coercion {
                    Coercion::Exact => {}
                    Coercion::Prefix => row.prefix_cells += 1,
                    Coercion::Blank => row.blank_cells += 1,
                    Coercion::Fallback => row.fallback_cells += 1,
                }
                FieldValue::Number(value)
            } else {
                FieldValue::Text(cell.trim().to_string())
            };
            row.columns.push((name.clone(), value));
        }

        Ok(row)
    }
}

// ── Typed records ─────────────────────────────────────────────────────────────

/// A record type that can be built from a decoded row.
pub trait FromRow: Sized {
    /// Human-readable name used in diagnostics.
    const KIND: &'static str;

    fn from_row(row: &DecodedRow) -> Self;
}

impl FromRow for RawRecord {
    const KIND: &'static str = "event";

    fn from_row(row: &DecodedRow) -> Self {
        let mut metrics = LeadMetrics::default();
        for metric in Metric::ALL {
            *metrics.get_mut(metric) = row.number(metric.column());
        }
        RawRecord {
            date: row.text(DATE_COLUMN).unwrap_or_default().to_string(),
            metrics,
            company: CompanyNames::parse(row.text(COMPANY_COLUMN).unwrap_or(NOT_AVAILABLE)),
        }
    }
}

impl FromRow for ContractRecord {
    const KIND: &'static str = "contract";

    fn from_row(row: &DecodedRow) -> Self {
        let text = |column| row.text(column).unwrap_or_default().to_string();
        let service_type = match row.text(SERVICE_TYPE_COLUMN) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        };
        ContractRecord {
            date: text(DATE_COLUMN),
            lead_name: text(LEAD_NAME_COLUMN),
            company: CompanyNames::parse(row.text(COMPANY_COLUMN).unwrap_or(NOT_AVAILABLE)),
            service_type,
            contract_date: text(CONTRACT_DATE_COLUMN),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::split_fields;

    const EVENT_HEADER: &str =
        "Date,Conversions,Spam,Unqualified Leads,Qualified Leads,Cost,Contracts Signed,Company Name";

    fn event_decoder() -> RecordDecoder {
        RecordDecoder::new(split_fields(EVENT_HEADER).unwrap())
    }

    // ── coerce_number ─────────────────────────────────────────────────────────

    #[test]
    fn test_coerce_exact() {
        assert_eq!(coerce_number("100.50"), (100.5, Coercion::Exact));
        assert_eq!(coerce_number(" 7 "), (7.0, Coercion::Exact));
        assert_eq!(coerce_number("-2"), (-2.0, Coercion::Exact));
        assert_eq!(coerce_number(".5"), (0.5, Coercion::Exact));
        assert_eq!(coerce_number("3."), (3.0, Coercion::Exact));
        assert_eq!(coerce_number("1e3"), (1000.0, Coercion::Exact));
    }

    #[test]
    fn test_coerce_blank_is_zero() {
        assert_eq!(coerce_number(""), (0.0, Coercion::Blank));
        assert_eq!(coerce_number("   "), (0.0, Coercion::Blank));
    }

    #[test]
    fn test_coerce_non_numeric_is_zero() {
        assert_eq!(coerce_number("N/A"), (0.0, Coercion::Fallback));
        assert_eq!(coerce_number("$100"), (0.0, Coercion::Fallback));
        assert_eq!(coerce_number("."), (0.0, Coercion::Fallback));
        assert_eq!(coerce_number("-"), (0.0, Coercion::Fallback));
    }

    #[test]
    fn test_coerce_numeric_prefix() {
        assert_eq!(coerce_number("12 leads"), (12.0, Coercion::Prefix));
        assert_eq!(coerce_number("1,250.00"), (1.0, Coercion::Prefix));
        assert_eq!(coerce_number("2e"), (2.0, Coercion::Prefix));
    }

    #[test]
    fn test_leading_integer_truncates() {
        assert_eq!(leading_integer("2.7"), Some(2.0));
        assert_eq!(leading_integer(" 15"), Some(15.0));
        assert_eq!(leading_integer("abc"), None);
        assert_eq!(leading_float("2.7"), Some(2.7));
    }

    // ── RecordDecoder ─────────────────────────────────────────────────────────

    #[test]
    fn test_decode_quoted_company_row() {
        let fields =
            split_fields(r#"2024-01-05,3,1,2,"Acme, Inc.",100.50,1,"Acme, Inc.""#).unwrap();
        let row = event_decoder().decode(fields).unwrap();

        // "Acme, Inc." sits in the Qualified Leads column and has no number.
        assert_eq!(row.number("Qualified Leads"), 0.0);
        assert_eq!(row.fallback_cells, 1);
        assert_eq!(row.number("Cost"), 100.5);
        assert_eq!(row.text("Company Name"), Some("Acme, Inc."));
        assert_eq!(row.text("Date"), Some("2024-01-05"));
    }

    #[test]
    fn test_decode_rejects_short_row() {
        let fields = split_fields("2024-01-05,3,1,2,4,100.50,1").unwrap();
        let err = event_decoder().decode(fields).unwrap_err();
        assert!(matches!(
            err,
            LeadsError::RowShape {
                expected: 8,
                found: 7
            }
        ));
    }

    #[test]
    fn test_decode_rejects_long_row() {
        let fields = split_fields("2024-01-05,3,1,2,4,100.50,1,Acme,extra").unwrap();
        assert!(event_decoder().decode(fields).is_err());
    }

    #[test]
    fn test_decode_empty_numeric_cell_is_zero() {
        let fields = split_fields("2024-01-05,,1,2,4,,1,Acme").unwrap();
        let row = event_decoder().decode(fields).unwrap();
        assert_eq!(row.get("Conversions"), Some(&FieldValue::Number(0.0)));
        assert_eq!(row.get("Cost"), Some(&FieldValue::Number(0.0)));
        assert_eq!(row.blank_cells, 2);
    }

    #[test]
    fn test_decode_keeps_empty_text() {
        let fields = split_fields("2024-01-05,1,1,1,1,1,1,").unwrap();
        let row = event_decoder().decode(fields).unwrap();
        assert_eq!(row.get("Company Name"), Some(&FieldValue::Text(String::new())));
    }

    #[test]
    fn test_columns_in_header_order() {
        let fields = split_fields("2024-01-05,1,1,1,1,1,1,Acme").unwrap();
        let row = event_decoder().decode(fields).unwrap();
        let names: Vec<&str> = row.columns().map(|(name, _)| name).collect();
        assert_eq!(names, split_fields(EVENT_HEADER).unwrap());
    }

    // ── FromRow ───────────────────────────────────────────────────────────────

    #[test]
    fn test_raw_record_from_row() {
        let fields = split_fields(r#"2024-02-01,2.5,1,3,4,10.5,1,"Acme, Globex""#).unwrap();
        let record = RawRecord::from_row(&event_decoder().decode(fields).unwrap());

        assert_eq!(record.date, "2024-02-01");
        assert_eq!(record.metrics.conversions, 2.5);
        assert_eq!(record.metrics.spam, 1.0);
        assert_eq!(record.metrics.unqualified_leads, 3.0);
        assert_eq!(record.metrics.qualified_leads, 4.0);
        assert_eq!(record.metrics.cost, 10.5);
        assert_eq!(record.metrics.contracts_signed, 1.0);
        assert_eq!(record.company.names(), ["Acme", "Globex"]);
    }

    #[test]
    fn test_contract_record_from_row() {
        let decoder = RecordDecoder::new(
            split_fields("Date, Lead Name, Company Name, Service Type, Contract Date").unwrap(),
        );
        let fields = split_fields("2024-01-03,Jane Doe,N/A,,2024-01-20").unwrap();
        let record = ContractRecord::from_row(&decoder.decode(fields).unwrap());

        assert_eq!(record.date, "2024-01-03");
        assert_eq!(record.lead_name, "Jane Doe");
        assert!(record.company.is_empty());
        assert_eq!(record.service_type, "N/A");
        assert_eq!(record.contract_date, "2024-01-20");
    }

    #[test]
    fn test_missing_columns_default() {
        let decoder = RecordDecoder::new(vec!["Date".to_string(), "Cost".to_string()]);
        let row = decoder
            .decode(vec!["2024-01-01".to_string(), "5".to_string()])
            .unwrap();
        let record = RawRecord::from_row(&row);
        assert_eq!(record.metrics.cost, 5.0);
        assert_eq!(record.metrics.spam, 0.0);
        assert_eq!(record.company, CompanyNames::not_available());
    }
}
