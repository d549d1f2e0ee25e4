//! New entries submitted by hand, converted into records.
//!
//! Form fields arrive as the text the user typed. Numbers follow the same
//! forgiving rules as file cells: anything unreadable becomes 0.

use leads_core::models::{CompanyNames, ContractRecord, LeadMetrics, RawRecord, NOT_AVAILABLE};
use leads_core::{LeadsError, Result};

use crate::decoder::{leading_float, leading_integer};

/// A daily event entry as typed into the form.
#[derive(Debug, Clone, Default)]
pub struct DailyEntryForm {
    pub date: String,
    pub conversions: String,
    pub spam: String,
    pub unqualified_leads: String,
    pub qualified_leads: String,
    pub cost: String,
    pub contracts_signed: String,
    pub company: String,
}

impl DailyEntryForm {
    /// Conversions and cost keep fractions; lead and contract counts drop them.
    pub fn into_record(self) -> RawRecord {
        let real = |s: &str| leading_float(s).unwrap_or(0.0);
        let count = |s: &str| leading_integer(s).unwrap_or(0.0);
        let company = if self.company.trim().is_empty() {
            CompanyNames::not_available()
        } else {
            CompanyNames::parse(&self.company)
        };

        RawRecord {
            date: self.date.trim().to_string(),
            metrics: LeadMetrics {
                conversions: real(&self.conversions),
                spam: count(&self.spam),
                unqualified_leads: count(&self.unqualified_leads),
                qualified_leads: count(&self.qualified_leads),
                cost: real(&self.cost),
                contracts_signed: count(&self.contracts_signed),
            },
            company,
        }
    }
}

/// A signed contract as typed into the form.
#[derive(Debug, Clone, Default)]
pub struct ContractForm {
    /// Date the lead came in.
    pub date: String,
    pub lead_name: String,
    /// Picked from the registry or typed as a new company.
    pub company: String,
    pub service_type: String,
    pub contract_date: String,
}

impl ContractForm {
    /// Fails with [`LeadsError::MissingCompany`] when no company was given.
    pub fn into_record(self) -> Result<ContractRecord> {
        let company = self.company.trim();
        if company.is_empty() {
            return Err(LeadsError::MissingCompany);
        }
        let service_type = match self.service_type.trim() {
            "" => NOT_AVAILABLE.to_string(),
            s => s.to_string(),
        };

        Ok(ContractRecord {
            date: self.date.trim().to_string(),
            lead_name: self.lead_name.trim().to_string(),
            company: CompanyNames::parse(company),
            service_type,
            contract_date: self.contract_date.trim().to_string(),
        })
    }
}
