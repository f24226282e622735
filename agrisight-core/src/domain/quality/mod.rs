// agrisight-core/src/domain/quality/mod.rs

pub mod config;
pub mod duplicate;
pub mod engine;
pub mod flag;
pub mod outlier;
pub mod rules;

// Re-exports
pub use config::QualityConfig;
pub use duplicate::{DuplicateTracker, deduplicate};
pub use engine::{AssessedRecord, QualityEngine, QualityReport};
pub use flag::{QualityFlags, QualityIssue};
pub use outlier::{FieldStats, OutlierCheck};
