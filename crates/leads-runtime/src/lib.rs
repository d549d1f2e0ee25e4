//! Runtime layer for the lead dashboard.
//!
//! Retrieves the two CSV sources and owns the in-memory session that keeps
//! records and derived views consistent.

pub mod pipeline;
pub mod sources;

pub use leads_core as core;
pub use leads_data as data;
