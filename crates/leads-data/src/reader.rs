//! Dataset loading: raw source text to typed records plus a load report.
//!
//! Loading never fails. Rows that do not fit the header are dropped and
//! listed in the [`LoadReport`]; a source that cannot be read produces an
//! empty dataset whose report says why.

use serde::Serialize;
use tracing::{debug, warn};

use leads_core::LeadsError;

use crate::decoder::{FromRow, RecordDecoder};
use crate::tokenizer::{has_content, split_fields};

const BYTE_ORDER_MARK: char = '\u{feff}';

// ── Public types ──────────────────────────────────────────────────────────────

/// A data line that was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// 1-based physical line number in the source text.
    pub line_number: usize,
    pub reason: String,
}

/// What happened while loading one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Source name, e.g. the file path.
    pub source: String,
    /// Why the source produced nothing, when it could not be read or parsed.
    pub unavailable: Option<String>,
    /// Non-blank data lines seen (header excluded).
    pub data_lines: usize,
    /// Records decoded successfully.
    pub decoded: usize,
    pub rejected: Vec<RejectedRow>,
    /// Numeric cells read as 0 because they were empty.
    pub blank_cells: usize,
    /// Numeric cells that only started with a number.
    pub prefix_cells: usize,
    /// Numeric cells read as 0 because they held no number.
    pub fallback_cells: usize,
}

impl LoadReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    /// `true` when the source yielded no records because it could not be used.
    pub fn is_unavailable(&self) -> bool {
        self.unavailable.is_some()
    }
}

/// Records decoded from one source with the report of how it went.
#[derive(Debug, Clone)]
pub struct Dataset<T> {
    pub records: Vec<T>,
    pub report: LoadReport,
}

impl<T> Dataset<T> {
    /// An empty dataset standing in for a source that could not be retrieved.
    pub fn unavailable(source: &str, error: &LeadsError) -> Self {
        warn!("{}; continuing with an empty dataset", error);
        let mut report = LoadReport::new(source);
        report.unavailable = Some(error.to_string());
        Self {
            records: Vec::new(),
            report,
        }
    }
}

// ── Line splitting ────────────────────────────────────────────────────────────

/// Split text into `(line_number, line)` pairs on `\n` or `\r\n`, skipping
/// lines that are blank after trimming. Line numbers are 1-based.
pub fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a whole source: first content line is the header, the rest are data.
///
/// `source` names the text in diagnostics.
pub fn parse_dataset<T: FromRow>(source: &str, text: &str) -> Dataset<T> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut report = LoadReport::new(source);
    let mut records = Vec::new();
    let mut lines = content_lines(text);

    let Some((header_line_number, header_line)) = lines.next() else {
        warn!("{} source {} is empty or has no data", T::KIND, source);
        return Dataset { records, report };
    };

    let header = match split_fields(header_line) {
        Ok(header) => header,
        Err(e) => {
            warn!(
                "Could not parse header of {} (line {}): {}",
                source, header_line_number, e
            );
            report.unavailable = Some(format!("unreadable header: {}", e));
            return Dataset { records, report };
        }
    };
    debug!("Header for {}: {:?}", source, header);
    let decoder = RecordDecoder::new(header);

    for (line_number, line) in lines {
        let fields = match split_fields(line) {
            Ok(fields) => fields,
            Err(e) => {
                report.data_lines += 1;
                reject(&mut report, line_number, line, &e);
                continue;
            }
        };
        if !has_content(&fields) {
            continue;
        }
        report.data_lines += 1;

        match decoder.decode(fields) {
            Ok(row) => {
                report.blank_cells += row.blank_cells;
                report.prefix_cells += row.prefix_cells;
                report.fallback_cells += row.fallback_cells;
                records.push(T::from_row(&row));
            }
            Err(e) => reject(&mut report, line_number, line, &e),
        }
    }

    report.decoded = records.len();
    debug!(
        "{}: {} data lines, {} decoded, {} rejected, {} blank / {} partial / {} non-numeric cells",
        source,
        report.data_lines,
        report.decoded,
        report.rejected.len(),
        report.blank_cells,
        report.prefix_cells,
        report.fallback_cells,
    );

    Dataset { records, report }
}

fn reject(report: &mut LoadReport, line_number: usize, line: &str, error: &LeadsError) {
    warn!(
        "Skipping malformed row in {} (line {}): {}: {:?}",
        report.source, line_number, error, line
    );
    report.rejected.push(RejectedRow {
        line_number,
        reason: error.to_string(),
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────────
