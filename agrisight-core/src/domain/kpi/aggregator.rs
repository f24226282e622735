// agrisight-core/src/domain/kpi/aggregator.rs

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::domain::kpi::rate::percentage;
use crate::domain::survey::SurveyRecord;

pub const UNKNOWN_GROUP: &str = "Unknown";

/// Headline numbers for a set of records.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct KpiSummary {
    pub records: usize,
    pub unique_farmers: usize,
    pub insured: usize,
    pub claims: usize,
    /// insured / records, percent (1 dp)
    pub coverage_rate: Option<f64>,
    /// claims / insured, percent (1 dp). None when nobody is insured.
    pub claim_rate: Option<f64>,
    pub total_payout: f64,
    pub avg_payout_per_claim: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupKpi {
    pub key: String,
    #[serde(flatten)]
    pub summary: KpiSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrder {
    /// Descending claim rate; undefined rates last.
    #[default]
    RiskRanking,
    /// Descending record count.
    Volume,
    /// Alphabetical.
    Key,
}

#[derive(Default)]
struct Tally<'a> {
    records: usize,
    farmers: HashSet<&'a str>,
    insured: usize,
    claims: usize,
    payout: f64,
    claim_payout: f64,
}

impl<'a> Tally<'a> {
    fn add(&mut self, record: &'a SurveyRecord) {
        self.records += 1;
        self.farmers.insert(record.farmer_id.as_str());
        if record.insured {
            self.insured += 1;
        }
        self.payout += record.payout();
        if record.claim_triggered {
            self.claims += 1;
            self.claim_payout += record.payout();
        }
    }

    fn finish(self) -> KpiSummary {
        let coverage_rate = undefined_as_none(percentage("coverage_rate", self.insured, self.records));
        let claim_rate = undefined_as_none(percentage("claim_rate", self.claims, self.insured));
        KpiSummary {
            records: self.records,
            unique_farmers: self.farmers.len(),
            insured: self.insured,
            claims: self.claims,
            coverage_rate,
            claim_rate,
            total_payout: self.payout,
            avg_payout_per_claim: (self.claims > 0)
                .then(|| self.claim_payout / self.claims as f64),
        }
    }
}

fn undefined_as_none(rate: Result<f64, crate::domain::error::DomainError>) -> Option<f64> {
    match rate {
        Ok(v) => Some(v),
        Err(e) => {
            debug!("{}", e);
            None
        }
    }
}

pub struct KpiAggregator;

impl KpiAggregator {
    pub fn summarize<'a, I>(records: I) -> KpiSummary
    where
        I: IntoIterator<Item = &'a SurveyRecord>,
    {
        let mut tally = Tally::default();
        for record in records {
            tally.add(record);
        }
        tally.finish()
    }

    /// Partition by `key`; records without a key land in "Unknown" so the
    /// groups always cover the whole input.
    pub fn group_by<'a, I, F>(records: I, key: F) -> Vec<GroupKpi>
    where
        I: IntoIterator<Item = &'a SurveyRecord>,
        F: Fn(&SurveyRecord) -> Option<&str>,
    {
        let mut tallies: BTreeMap<String, Tally<'a>> = BTreeMap::new();
        for record in records {
            let k = key(record)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .unwrap_or(UNKNOWN_GROUP);
            tallies.entry(k.to_string()).or_default().add(record);
        }
        tallies
            .into_iter()
            .map(|(key, tally)| GroupKpi {
                key,
                summary: tally.finish(),
            })
            .collect()
    }

    pub fn by_region<'a, I>(records: I) -> Vec<GroupKpi>
    where
        I: IntoIterator<Item = &'a SurveyRecord>,
    {
        Self::group_by(records, |r| r.region.as_deref())
    }

    pub fn by_agent<'a, I>(records: I) -> Vec<GroupKpi>
    where
        I: IntoIterator<Item = &'a SurveyRecord>,
    {
        Self::group_by(records, |r| r.agent_id.as_deref())
    }

    pub fn by_country<'a, I>(records: I) -> Vec<GroupKpi>
    where
        I: IntoIterator<Item = &'a SurveyRecord>,
    {
        Self::group_by(records, |r| r.country.as_deref())
    }

    pub fn order(mut groups: Vec<GroupKpi>, order: GroupOrder) -> Vec<GroupKpi> {
        groups.sort_by(|a, b| {
            let primary = match order {
                GroupOrder::RiskRanking => compare_rate_desc(a.summary.claim_rate, b.summary.claim_rate),
                GroupOrder::Volume => b.summary.records.cmp(&a.summary.records),
                GroupOrder::Key => Ordering::Equal,
            };
            primary.then_with(|| a.key.cmp(&b.key))
        });
        groups
    }
}

fn compare_rate_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
