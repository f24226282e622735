// agrisight-core/src/domain/kpi/mod.rs

pub mod aggregator;
pub mod alerts;
pub mod config;
pub mod rate;
pub mod table;

pub use aggregator::{GroupKpi, GroupOrder, KpiAggregator, KpiSummary};
pub use alerts::{IssueHotspot, high_issue_regions};
pub use config::{KpiConfig, KpiScope};
pub use table::{display_rate, display_usd, group_table};
