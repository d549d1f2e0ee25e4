//! Shared types for the lead dashboard: records, derived views, errors,
//! date handling, formatting and CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{LeadsError, Result};
