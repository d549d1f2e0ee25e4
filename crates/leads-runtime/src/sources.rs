//! Where source text comes from, and how a failed retrieval degrades.

use std::future::Future;
use std::path::PathBuf;

use leads_core::{LeadsError, Result};
use leads_data::decoder::FromRow;
use leads_data::reader::{parse_dataset, Dataset};

// ── TextSource ────────────────────────────────────────────────────────────────

/// Something that can produce the full text of a CSV export.
pub trait TextSource {
    /// Name used in logs and load reports.
    fn name(&self) -> String;

    /// Retrieve the whole text. This is the only suspension point of a load.
    fn fetch(&self) -> impl Future<Output = Result<String>> + Send;
}

/// A CSV file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> impl Future<Output = Result<String>> + Send {
        let path = self.path.clone();
        async move {
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| LeadsError::FileRead { path, source })
        }
    }
}

/// Text held in memory, or a retrieval that always fails.
#[derive(Debug, Clone)]
pub struct InlineSource {
    name: String,
    text: std::result::Result<String, String>,
}

impl InlineSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Ok(text.into()),
        }
    }

    /// A source whose retrieval fails with `reason`.
    pub fn failing(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Err(reason.into()),
        }
    }
}

impl TextSource for InlineSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn fetch(&self) -> impl Future<Output = Result<String>> + Send {
        let result = self.text.clone().map_err(|reason| LeadsError::SourceUnavailable {
            name: self.name.clone(),
            reason,
        });
        async move { result }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Fetch and parse one source. A failed fetch yields an empty dataset whose
/// report records the failure.
pub async fn load_dataset<T: FromRow, S: TextSource>(source: &S) -> Dataset<T> {
    let name = source.name();
    match source.fetch().await {
        Ok(text) => {
            tracing::debug!("Read {} bytes from {}", text.len(), name);
            parse_dataset(&name, &text)
        }
        Err(e) => {
            let error = match e {
                unavailable @ LeadsError::SourceUnavailable { .. } => unavailable,
                other => LeadsError::SourceUnavailable {
                    name: name.clone(),
                    reason: other.to_string(),
                },
            };
            Dataset::unavailable(&name, &error)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
