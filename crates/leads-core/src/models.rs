use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sentinel used in company and service-type cells for "no value".
pub const NOT_AVAILABLE: &str = "N/A";

// ── Metric ────────────────────────────────────────────────────────────────────

/// The six numeric columns of the event-level source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Conversions,
    Spam,
    UnqualifiedLeads,
    QualifiedLeads,
    Cost,
    ContractsSigned,
}

impl Metric {
    /// All metrics in column order.
    pub const ALL: [Metric; 6] = [
        Metric::Conversions,
        Metric::Spam,
        Metric::UnqualifiedLeads,
        Metric::QualifiedLeads,
        Metric::Cost,
        Metric::ContractsSigned,
    ];

    /// Metrics charted together by default (cost has its own chart).
    pub const CHARTED: [Metric; 5] = [
        Metric::Conversions,
        Metric::Spam,
        Metric::UnqualifiedLeads,
        Metric::QualifiedLeads,
        Metric::ContractsSigned,
    ];

    /// Header label of the column holding this metric.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Conversions => "Conversions",
            Metric::Spam => "Spam",
            Metric::UnqualifiedLeads => "Unqualified Leads",
            Metric::QualifiedLeads => "Qualified Leads",
            Metric::Cost => "Cost",
            Metric::ContractsSigned => "Contracts Signed",
        }
    }

    /// Look a metric up by its header label.
    pub fn from_column(column: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.column() == column)
    }

    /// `true` for the whole-number metrics (lead and contract counts).
    pub fn is_count(self) -> bool {
        !matches!(self, Metric::Conversions | Metric::Cost)
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    /// Accepts either the header label or the snake_case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(metric) = Metric::from_column(s) {
            return Ok(metric);
        }
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "conversions" => Ok(Metric::Conversions),
            "spam" => Ok(Metric::Spam),
            "unqualified_leads" => Ok(Metric::UnqualifiedLeads),
            "qualified_leads" => Ok(Metric::QualifiedLeads),
            "cost" => Ok(Metric::Cost),
            "contracts_signed" => Ok(Metric::ContractsSigned),
            other => Err(format!("unknown metric: {}", other)),
        }
    }
}

// ── LeadMetrics ───────────────────────────────────────────────────────────────

/// Numeric values of one event row, or their sum over many rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadMetrics {
    pub conversions: f64,
    pub spam: f64,
    pub unqualified_leads: f64,
    pub qualified_leads: f64,
    /// Spend in currency units.
    pub cost: f64,
    pub contracts_signed: f64,
}

impl LeadMetrics {
    /// Value of a single metric.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Conversions => self.conversions,
            Metric::Spam => self.spam,
            Metric::UnqualifiedLeads => self.unqualified_leads,
            Metric::QualifiedLeads => self.qualified_leads,
            Metric::Cost => self.cost,
            Metric::ContractsSigned => self.contracts_signed,
        }
    }

    /// Mutable access to a single metric.
    pub fn get_mut(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::Conversions => &mut self.conversions,
            Metric::Spam => &mut self.spam,
            Metric::UnqualifiedLeads => &mut self.unqualified_leads,
            Metric::QualifiedLeads => &mut self.qualified_leads,
            Metric::Cost => &mut self.cost,
            Metric::ContractsSigned => &mut self.contracts_signed,
        }
    }

    /// Add every metric of `other` to the running totals.
    pub fn accumulate(&mut self, other: &LeadMetrics) {
        for metric in Metric::ALL {
            *self.get_mut(metric) += other.get(metric);
        }
    }
}

// ── CompanyNames ──────────────────────────────────────────────────────────────

/// A company cell: the text as written plus the names it encodes.
///
/// Cells may list several companies joined by commas, or hold the `"N/A"`
/// sentinel. Names are split and trimmed once, when the cell is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyNames {
    raw: String,
    names: Vec<String>,
}

impl CompanyNames {
    /// Decode a company cell.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let names = if raw == NOT_AVAILABLE {
            Vec::new()
        } else {
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        };
        Self {
            raw: raw.to_string(),
            names,
        }
    }

    /// The sentinel value used when no company is known.
    pub fn not_available() -> Self {
        Self::parse(NOT_AVAILABLE)
    }

    /// The cell text as it appeared in the source (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Individual company names, in cell order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl std::fmt::Display for CompanyNames {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One row of the event-level source (`master_data.csv`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Date cell as written; compared as a calendar date.
    pub date: String,
    #[serde(flatten)]
    pub metrics: LeadMetrics,
    pub company: CompanyNames,
}

/// One row of the contracts source (`qualified_contracts.csv`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Date the lead came in.
    pub date: String,
    pub lead_name: String,
    pub company: CompanyNames,
    /// Service sold; `"N/A"` when blank.
    pub service_type: String,
    pub contract_date: String,
}

// ── Derived views ─────────────────────────────────────────────────────────────

/// All event rows sharing one date, summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: String,
    #[serde(flatten)]
    pub metrics: LeadMetrics,
    /// Number of raw rows folded into this day.
    pub rows: u32,
}

/// Lead funnel stages reported as pipeline totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    SpamLeads,
    UnqualifiedLeads,
    QualifiedLeads,
    ContractsSigned,
}

impl PipelineStage {
    /// Stages in funnel order.
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::SpamLeads,
        PipelineStage::UnqualifiedLeads,
        PipelineStage::QualifiedLeads,
        PipelineStage::ContractsSigned,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::SpamLeads => "Spam Leads",
            PipelineStage::UnqualifiedLeads => "Unqualified Leads",
            PipelineStage::QualifiedLeads => "Qualified Leads",
            PipelineStage::ContractsSigned => "Contracts Signed",
        }
    }

    /// The event metric summed for this stage.
    pub fn metric(self) -> Metric {
        match self {
            PipelineStage::SpamLeads => Metric::Spam,
            PipelineStage::UnqualifiedLeads => Metric::UnqualifiedLeads,
            PipelineStage::QualifiedLeads => Metric::QualifiedLeads,
            PipelineStage::ContractsSigned => Metric::ContractsSigned,
        }
    }
}

/// Sum of one funnel stage across every day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStageTotal {
    pub stage: PipelineStage,
    pub label: String,
    pub total: f64,
}

// ── CompanyRegistry ───────────────────────────────────────────────────────────

/// Every company name seen in either source. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyRegistry {
    names: BTreeSet<String>,
}

impl CompanyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every name in a company cell; returns how many were new.
    pub fn register(&mut self, company: &CompanyNames) -> usize {
        company
            .names()
            .iter()
            .filter(|name| self.names.insert((*name).clone()))
            .count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
