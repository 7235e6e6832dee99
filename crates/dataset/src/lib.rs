//! Chat-format JSONL dataset validation
//!
//! Checks fine-tuning training/validation files line by line, collects
//! statistics and an itemized error list, and renders human-readable reports.

pub mod schema;
pub mod error;
pub mod config;
mod lines;
pub mod quality;
pub mod validator;
pub mod summary;
pub mod report;

pub use schema::*;
pub use error::*;
pub use config::*;
pub use quality::QualityReport;
pub use validator::{validate_file, validate_reader, FileValidation, ValidationStats};
pub use summary::{CostEstimate, DatasetSummary, NamedValidation};
pub use report::{group_thousands, FileReport, SummaryReport};
