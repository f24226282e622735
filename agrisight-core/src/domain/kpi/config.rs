// agrisight-core/src/domain/kpi/config.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::quality::AssessedRecord;
use crate::domain::survey::SurveyRecord;

/// Which rows feed the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiScope {
    #[default]
    Clean,
    All,
}

impl KpiScope {
    pub fn select<'a, I>(&self, rows: I) -> Vec<&'a SurveyRecord>
    where
        I: IntoIterator<Item = &'a AssessedRecord>,
    {
        rows.into_iter()
            .filter(|r| match self {
                KpiScope::Clean => r.is_clean(),
                KpiScope::All => true,
            })
            .map(|r| &r.record)
            .collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct KpiConfig {
    #[serde(default)]
    pub scope: KpiScope,

    /// Rows in the agent performance table.
    #[serde(default = "default_top_agents")]
    #[validate(range(min = 1))]
    pub top_agents: usize,

    /// A record with more issues than this feeds the data-quality alert.
    #[serde(default = "default_high_issue_threshold")]
    pub high_issue_threshold: usize,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            scope: KpiScope::Clean,
            top_agents: default_top_agents(),
            high_issue_threshold: default_high_issue_threshold(),
        }
    }
}

fn default_top_agents() -> usize {
    10
}

fn default_high_issue_threshold() -> usize {
    2
}
