//! CSV ingestion and aggregation for the lead dashboard.
//!
//! Tokenizes and decodes the event and contract exports, derives per-day
//! aggregates and funnel totals, and narrows any view to a date range.

pub mod aggregator;
pub mod decoder;
pub mod entry_form;
pub mod filter;
pub mod reader;
pub mod series;
pub mod tokenizer;

pub use leads_core as core;
