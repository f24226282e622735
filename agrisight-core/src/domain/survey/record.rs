// agrisight-core/src/domain/survey/record.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One farmer interview.
///
/// Everything but the id and the two Yes/No answers is optional: a raw table
/// legitimately carries holes, and spotting them is the rule engine's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub farmer_id: String,
    pub agent_id: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub crop: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub survey_date: Option<NaiveDate>,
    pub insured: bool,
    pub claim_triggered: bool,
    pub payout_amount_usd: Option<f64>,
    pub farm_size_ha: Option<f64>,
    pub yield_kg_per_ha: Option<f64>,
    pub household_size: Option<u32>,
}

impl SurveyRecord {
    /// Payout as used by the aggregator: an absent amount counts as zero.
    pub fn payout(&self) -> f64 {
        self.payout_amount_usd.unwrap_or(0.0)
    }

    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::FarmSizeHa => self.farm_size_ha,
            NumericField::YieldKgPerHa => self.yield_kg_per_ha,
            NumericField::HouseholdSize => self.household_size.map(f64::from),
            NumericField::PayoutAmountUsd => self.payout_amount_usd,
        }
    }
}

/// Numeric survey answers the outlier rule can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    FarmSizeHa,
    YieldKgPerHa,
    HouseholdSize,
    PayoutAmountUsd,
}

impl NumericField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FarmSizeHa => "farm_size_ha",
            Self::YieldKgPerHa => "yield_kg_per_ha",
            Self::HouseholdSize => "household_size",
            Self::PayoutAmountUsd => "payout_amount_usd",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A fully populated, internally consistent record.
    pub fn record(id: &str) -> SurveyRecord {
        SurveyRecord {
            farmer_id: id.to_string(),
            agent_id: Some("AG-001".into()),
            country: Some("Kenya".into()),
            region: Some("Rift Valley".into()),
            crop: Some("Maize".into()),
            latitude: Some(0.5),
            longitude: Some(35.3),
            survey_date: NaiveDate::from_ymd_opt(2025, 3, 14),
            insured: false,
            claim_triggered: false,
            payout_amount_usd: Some(0.0),
            farm_size_ha: Some(2.0),
            yield_kg_per_ha: Some(1800.0),
            household_size: Some(6),
        }
    }

    pub fn insured(id: &str) -> SurveyRecord {
        SurveyRecord {
            insured: true,
            ..record(id)
        }
    }

    pub fn claimed(id: &str, payout: f64) -> SurveyRecord {
        SurveyRecord {
            insured: true,
            claim_triggered: true,
            payout_amount_usd: Some(payout),
            ..record(id)
        }
    }
}
