//! The in-memory dashboard session.
//!
//! [`LeadPipeline`] owns the event and contract records, the company registry
//! and the views derived from them. Every mutation re-sorts the records and
//! re-derives the daily aggregates and funnel totals before returning, so
//! reads never observe stale views.

use serde::Serialize;

use leads_core::models::{
    CompanyRegistry, ContractRecord, DailyAggregate, PipelineStageTotal, RawRecord,
};
use leads_core::Result;
use leads_data::aggregator::{DailyAggregator, DailyTotals};
use leads_data::entry_form::{ContractForm, DailyEntryForm};
use leads_data::filter::{filter_by_range, sort_records, DateRange};
use leads_data::reader::{Dataset, LoadReport};

use crate::sources::{load_dataset, TextSource};

// ── Public types ──────────────────────────────────────────────────────────────

/// Event rows plus the views derived from them, all for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub raw: Vec<RawRecord>,
    pub contracts: Vec<ContractRecord>,
    pub daily: Vec<DailyAggregate>,
    pub stages: Vec<PipelineStageTotal>,
}

// ── LeadPipeline ──────────────────────────────────────────────────────────────

/// Single-writer owner of the dashboard data.
#[derive(Debug, Clone)]
pub struct LeadPipeline {
    raw: Vec<RawRecord>,
    contracts: Vec<ContractRecord>,
    companies: CompanyRegistry,
    daily: Vec<DailyAggregate>,
    stages: Vec<PipelineStageTotal>,
    reports: Vec<LoadReport>,
}

impl Default for LeadPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadPipeline {
    /// An empty session.
    pub fn new() -> Self {
        let mut pipeline = Self {
            raw: Vec::new(),
            contracts: Vec::new(),
            companies: CompanyRegistry::new(),
            daily: Vec::new(),
            stages: Vec::new(),
            reports: Vec::new(),
        };
        pipeline.derive_views();
        pipeline
    }

    /// Retrieve both sources concurrently and build a session once both are in.
    ///
    /// Never fails: a source that cannot be read contributes nothing and is
    /// noted in [`LeadPipeline::load_reports`].
    pub async fn load<E: TextSource, C: TextSource>(events: &E, contracts: &C) -> Self {
        tracing::debug!("Loading {} and {}", events.name(), contracts.name());
        let (events, contracts): (Dataset<RawRecord>, Dataset<ContractRecord>) =
            tokio::join!(load_dataset(events), load_dataset(contracts));
        Self::from_datasets(events, contracts)
    }

    /// Build a session from already-parsed datasets.
    pub fn from_datasets(events: Dataset<RawRecord>, contracts: Dataset<ContractRecord>) -> Self {
        let mut pipeline = Self {
            raw: events.records,
            contracts: contracts.records,
            companies: CompanyRegistry::new(),
            daily: Vec::new(),
            stages: Vec::new(),
            reports: vec![events.report, contracts.report],
        };

        for contract in &pipeline.contracts {
            pipeline.companies.register(&contract.company);
        }
        for record in &pipeline.raw {
            pipeline.companies.register(&record.company);
        }

        pipeline.derive_views();
        tracing::info!(
            "Loaded {} event rows ({} days), {} contracts, {} companies",
            pipeline.raw.len(),
            pipeline.daily.len(),
            pipeline.contracts.len(),
            pipeline.companies.len()
        );
        pipeline
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Add an event row; views are re-derived before this returns.
    pub fn append_daily(&mut self, record: RawRecord) {
        let added = self.companies.register(&record.company);
        tracing::debug!(date = %record.date, new_companies = added, "appending event row");
        self.raw.push(record);
        self.derive_views();
    }

    /// Add a contract; views are re-derived before this returns.
    pub fn append_contract(&mut self, record: ContractRecord) {
        let added = self.companies.register(&record.company);
        tracing::debug!(date = %record.date, new_companies = added, "appending contract");
        self.contracts.push(record);
        self.derive_views();
    }

    /// Convert a submitted daily form and append it.
    pub fn submit_daily(&mut self, form: DailyEntryForm) {
        self.append_daily(form.into_record());
    }

    /// Convert a submitted contract form and append it.
    ///
    /// A form without a company is rejected and nothing changes.
    pub fn submit_contract(&mut self, form: ContractForm) -> Result<()> {
        let record = form.into_record()?;
        self.append_contract(record);
        Ok(())
    }

    /// Re-sort both record sets by date and recompute every derived view.
    pub fn derive_views(&mut self) {
        sort_records(&mut self.raw);
        sort_records(&mut self.contracts);
        self.daily = DailyAggregator::aggregate_by_date(&self.raw);
        self.stages = DailyAggregator::pipeline_totals(&self.daily);
    }

    // ── Read access ───────────────────────────────────────────────────────

    /// Event rows in date order.
    pub fn raw_records(&self) -> &[RawRecord] {
        &self.raw
    }

    /// Contracts in lead-date order.
    pub fn contracts(&self) -> &[ContractRecord] {
        &self.contracts
    }

    pub fn daily(&self) -> &[DailyAggregate] {
        &self.daily
    }

    pub fn pipeline_totals(&self) -> &[PipelineStageTotal] {
        &self.stages
    }

    pub fn companies(&self) -> &CompanyRegistry {
        &self.companies
    }

    /// Totals across every day, for a table footer.
    pub fn totals(&self) -> DailyTotals {
        DailyAggregator::calculate_totals(&self.daily)
    }

    /// One report per source, events first.
    pub fn load_reports(&self) -> &[LoadReport] {
        &self.reports
    }

    /// Every view narrowed to `[start, end]`.
    ///
    /// Either bound missing gives the unfiltered views; a bound that is not a
    /// date is an error. Funnel totals are summed over the filtered days.
    pub fn view(&self, start: Option<&str>, end: Option<&str>) -> Result<DashboardView> {
        let range = DateRange::from_bounds(start, end)?;
        let Some(range) = range else {
            return Ok(DashboardView {
                raw: self.raw.clone(),
                contracts: self.contracts.clone(),
                daily: self.daily.clone(),
                stages: self.stages.clone(),
            });
        };

        let daily = filter_by_range(&self.daily, Some(&range));
        let stages = DailyAggregator::pipeline_totals(&daily);
        Ok(DashboardView {
            raw: filter_by_range(&self.raw, Some(&range)),
            contracts: filter_by_range(&self.contracts, Some(&range)),
            daily,
            stages,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::InlineSource;
    use leads_core::LeadsError;

    const EVENTS: &str = "\
Date,Conversions,Spam,Unqualified Leads,Qualified Leads,Cost,Contracts Signed,Company Name
2024-02-01,1,2,1,0,10.5,0,N/A
2024-01-15,2,0,3,2,20,1,\"Acme, Globex\"
2024-02-01,0.5,1,0,1,4.5,1,Initech
2024-01-20,1,1,1,1
";

    const CONTRACTS: &str = "\
Date, Lead Name, Company Name, Service Type, Contract Date
2024-02-01,Jane Doe,Initech,SEO,2024-02-10
2024-01-15,John Roe,Hooli,,2024-01-30
";

    async fn loaded() -> LeadPipeline {
        LeadPipeline::load(
            &InlineSource::new("master_data.csv", EVENTS),
            &InlineSource::new("qualified_contracts.csv", CONTRACTS),
        )
        .await
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_load_sorts_and_derives() {
        let pipeline = loaded().await;

        let dates: Vec<&str> = pipeline.raw_records().iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-15", "2024-02-01", "2024-02-01"]);

        assert_eq!(pipeline.daily().len(), 2);
        assert_eq!(pipeline.daily()[1].date, "2024-02-01");
        assert_eq!(pipeline.daily()[1].metrics.cost, 15.0);
        assert_eq!(pipeline.daily()[1].rows, 2);

        let contract_dates: Vec<&str> =
            pipeline.contracts().iter().map(|c| c.date.as_str()).collect();
        assert_eq!(contract_dates, vec!["2024-01-15", "2024-02-01"]);
        assert_eq!(pipeline.contracts()[0].service_type, "N/A");
    }

    #[tokio::test]
    async fn test_load_reports_malformed_rows() {
        let pipeline = loaded().await;
        let reports = pipeline.load_reports();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].source, "master_data.csv");
        assert_eq!(reports[0].decoded, 3);
        assert_eq!(reports[0].rejected.len(), 1);
        assert_eq!(reports[0].rejected[0].line_number, 5);
        assert!(reports[1].rejected.is_empty());
    }

    #[tokio::test]
    async fn test_load_builds_company_registry_from_both_sources() {
        let pipeline = loaded().await;
        let names: Vec<&str> = pipeline.companies().iter().collect();
        assert_eq!(names, vec!["Acme", "Globex", "Hooli", "Initech"]);
    }

    #[tokio::test]
    async fn test_pipeline_totals_after_load() {
        let pipeline = loaded().await;
        let totals: Vec<(&str, f64)> = pipeline
            .pipeline_totals()
            .iter()
            .map(|t| (t.label.as_str(), t.total))
            .collect();
        assert_eq!(
            totals,
            vec![
                ("Spam Leads", 3.0),
                ("Unqualified Leads", 4.0),
                ("Qualified Leads", 3.0),
                ("Contracts Signed", 2.0)
            ]
        );
    }

    #[tokio::test]
    async fn test_unavailable_source_keeps_other() {
        let pipeline = LeadPipeline::load(
            &InlineSource::new("master_data.csv", EVENTS),
            &InlineSource::failing("qualified_contracts.csv", "HTTP 500"),
        )
        .await;

        assert_eq!(pipeline.raw_records().len(), 3);
        assert!(pipeline.contracts().is_empty());
        assert!(pipeline.load_reports()[1].is_unavailable());
        assert_eq!(pipeline.daily().len(), 2);
    }

    #[tokio::test]
    async fn test_both_sources_unavailable() {
        let pipeline = LeadPipeline::load(
            &InlineSource::failing("a", "down"),
            &InlineSource::failing("b", "down"),
        )
        .await;
        assert!(pipeline.raw_records().is_empty());
        assert!(pipeline.daily().is_empty());
        assert_eq!(pipeline.pipeline_totals().len(), 4);
        assert!(pipeline.companies().is_empty());
    }

    // ── append ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_append_daily_rederives_views() {
        let mut pipeline = loaded().await;
        pipeline.submit_daily(DailyEntryForm {
            date: "2024-01-01".to_string(),
            spam: "4".to_string(),
            cost: "7.25".to_string(),
            company: "Umbrella".to_string(),
            ..Default::default()
        });

        assert_eq!(pipeline.raw_records()[0].date, "2024-01-01");
        assert_eq!(pipeline.daily().len(), 3);
        assert_eq!(pipeline.daily()[0].metrics.cost, 7.25);
        assert_eq!(pipeline.pipeline_totals()[0].total, 7.0);
        assert!(pipeline.companies().contains("Umbrella"));
    }

    #[tokio::test]
    async fn test_append_to_existing_day() {
        let mut pipeline = loaded().await;
        pipeline.submit_daily(DailyEntryForm {
            date: "2024-02-01".to_string(),
            cost: "5".to_string(),
            ..Default::default()
        });
        assert_eq!(pipeline.daily().len(), 2);
        assert_eq!(pipeline.daily()[1].metrics.cost, 20.0);
        assert_eq!(pipeline.daily()[1].rows, 3);
    }

    #[tokio::test]
    async fn test_submit_contract() {
        let mut pipeline = loaded().await;
        pipeline
            .submit_contract(ContractForm {
                date: "2024-01-01".to_string(),
                lead_name: "Ann Lee".to_string(),
                company: "Vandelay".to_string(),
                service_type: "PPC".to_string(),
                contract_date: "2024-01-09".to_string(),
            })
            .unwrap();

        assert_eq!(pipeline.contracts().len(), 3);
        assert_eq!(pipeline.contracts()[0].lead_name, "Ann Lee");
        assert!(pipeline.companies().contains("Vandelay"));
    }

    #[tokio::test]
    async fn test_submit_contract_without_company_changes_nothing() {
        let mut pipeline = loaded().await;
        let err = pipeline
            .submit_contract(ContractForm {
                date: "2024-01-01".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, LeadsError::MissingCompany));
        assert_eq!(pipeline.contracts().len(), 2);
    }

    #[test]
    fn test_registry_never_shrinks() {
        let mut pipeline = LeadPipeline::new();
        pipeline.append_daily(RawRecord {
            date: "2024-01-01".to_string(),
            metrics: Default::default(),
            company: leads_core::models::CompanyNames::parse("Acme"),
        });
        let before = pipeline.companies().len();
        pipeline.derive_views();
        assert_eq!(pipeline.companies().len(), before);
    }

    // ── view ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_view_unbounded_is_everything() {
        let pipeline = loaded().await;
        let view = pipeline.view(None, Some("2024-01-31")).unwrap();
        assert_eq!(view.raw, pipeline.raw_records());
        assert_eq!(view.daily, pipeline.daily());
        assert_eq!(view.stages, pipeline.pipeline_totals());
    }

    #[tokio::test]
    async fn test_view_range_narrows_and_resums() {
        let pipeline = loaded().await;
        let view = pipeline.view(Some("2024-02-01"), Some("2024-02-01")).unwrap();

        assert_eq!(view.raw.len(), 2);
        assert_eq!(view.daily.len(), 1);
        assert_eq!(view.contracts.len(), 1);
        assert_eq!(view.stages[0].total, 3.0);
        assert_eq!(view.stages[3].total, 1.0);
    }

    #[tokio::test]
    async fn test_view_invalid_bound() {
        let pipeline = loaded().await;
        let err = pipeline.view(Some("someday"), Some("2024-02-01")).unwrap_err();
        assert!(matches!(err, LeadsError::InvalidDateBound(_)));
    }

    #[tokio::test]
    async fn test_totals() {
        let pipeline = loaded().await;
        let totals = pipeline.totals();
        assert_eq!(totals.days, 2);
        assert_eq!(totals.rows, 3);
        assert_eq!(totals.metrics.cost, 35.0);
    }
}
