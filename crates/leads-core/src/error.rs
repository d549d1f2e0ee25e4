use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the lead dashboard crates.
#[derive(Error, Debug)]
pub enum LeadsError {
    /// A source could not be retrieved at all.
    #[error("Source {name} unavailable: {reason}")]
    SourceUnavailable { name: String, reason: String },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data line does not have as many fields as the header.
    #[error("Row has {found} fields, header has {expected}")]
    RowShape { expected: usize, found: usize },

    /// A quoted field was still open when the line ended.
    #[error("Unterminated quote in field {field}")]
    UnterminatedQuote { field: usize },

    /// Something other than whitespace followed a closing quote.
    #[error("Unexpected text after closing quote in field {field}")]
    TrailingAfterQuote { field: usize },

    /// A caller-supplied date range bound is not a recognised date.
    #[error("Invalid date bound: {0}")]
    InvalidDateBound(String),

    /// A new contract was submitted without a company name.
    #[error("Company name is required for a new contract")]
    MissingCompany,
}

impl LeadsError {
    /// `true` for errors that reject a single data row.
    pub fn is_row_shape(&self) -> bool {
        matches!(
            self,
            LeadsError::RowShape { .. }
                | LeadsError::UnterminatedQuote { .. }
                | LeadsError::TrailingAfterQuote { .. }
        )
    }
}

/// Convenience alias used throughout the lead dashboard crates.
pub type Result<T> = std::result::Result<T, LeadsError>;
