// agrisight-core/src/domain/generator/config.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::error::DomainError;

/// Parameters of the synthetic survey.
///
/// The five `*_rate` fields are the probabilities of the mutually exclusive
/// defect categories, so their sum must stay within `[0, 1]`.
#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
#[validate(schema(function = "validate_generator_config"))]
pub struct GeneratorConfig {
    #[serde(default = "default_records")]
    #[validate(range(min = 1))]
    pub records: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_missing_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub missing_rate: f64,

    #[serde(default = "default_duplicate_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub duplicate_rate: f64,

    #[serde(default = "default_invalid_gps_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub invalid_gps_rate: f64,

    #[serde(default = "default_outlier_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub outlier_rate: f64,

    #[serde(default = "default_inconsistent_claim_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub inconsistent_claim_rate: f64,

    /// Injected outliers sit at this multiple of the field's expected maximum.
    #[serde(default = "default_outlier_multiplier")]
    #[validate(range(min = 2.0))]
    pub outlier_multiplier: f64,

    #[serde(default = "default_insured_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub insured_rate: f64,

    /// Probability that an insured farmer filed a claim.
    #[serde(default = "default_claim_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub claim_rate: f64,

    #[serde(default = "default_payout_min")]
    #[validate(range(exclusive_min = 0.0))]
    pub payout_min: f64,

    #[serde(default = "default_payout_max")]
    #[validate(range(exclusive_min = 0.0))]
    pub payout_max: f64,

    #[serde(default = "default_agent_count")]
    #[validate(range(min = 1, max = 999))]
    pub agent_count: u32,

    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            records: default_records(),
            seed: default_seed(),
            missing_rate: default_missing_rate(),
            duplicate_rate: default_duplicate_rate(),
            invalid_gps_rate: default_invalid_gps_rate(),
            outlier_rate: default_outlier_rate(),
            inconsistent_claim_rate: default_inconsistent_claim_rate(),
            outlier_multiplier: default_outlier_multiplier(),
            insured_rate: default_insured_rate(),
            claim_rate: default_claim_rate(),
            payout_min: default_payout_min(),
            payout_max: default_payout_max(),
            agent_count: default_agent_count(),
            start_date: default_start_date(),
            end_date: default_end_date(),
        }
    }
}

impl GeneratorConfig {
    pub fn defect_rate_total(&self) -> f64 {
        self.missing_rate
            + self.duplicate_rate
            + self.invalid_gps_rate
            + self.outlier_rate
            + self.inconsistent_claim_rate
    }

    /// Validator errors folded into the domain error the pipeline reports.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::ConfigurationError(format!("generator: {}", e)))
    }
}

fn validate_generator_config(config: &GeneratorConfig) -> Result<(), ValidationError> {
    // Range checks let NaN through; every comparison with it is false.
    let numbers = [
        config.missing_rate,
        config.duplicate_rate,
        config.invalid_gps_rate,
        config.outlier_rate,
        config.inconsistent_claim_rate,
        config.outlier_multiplier,
        config.insured_rate,
        config.claim_rate,
        config.payout_min,
        config.payout_max,
    ];
    if numbers.iter().any(|v| !v.is_finite()) {
        return Err(ValidationError::new("non_finite_parameter"));
    }
    if config.defect_rate_total() > 1.0 + f64::EPSILON {
        return Err(ValidationError::new("defect_rates_exceed_one"));
    }
    if config.start_date > config.end_date {
        return Err(ValidationError::new("start_date_after_end_date"));
    }
    if config.payout_min > config.payout_max {
        return Err(ValidationError::new("payout_min_above_max"));
    }
    Ok(())
}

fn default_records() -> usize {
    1500
}
fn default_seed() -> u64 {
    2026
}
fn default_missing_rate() -> f64 {
    0.05
}
fn default_duplicate_rate() -> f64 {
    0.02
}
fn default_invalid_gps_rate() -> f64 {
    0.01
}
fn default_outlier_rate() -> f64 {
    0.02
}
fn default_inconsistent_claim_rate() -> f64 {
    0.02
}
fn default_outlier_multiplier() -> f64 {
    5.0
}
fn default_insured_rate() -> f64 {
    0.39
}
fn default_claim_rate() -> f64 {
    0.168
}
fn default_payout_min() -> f64 {
    50.0
}
fn default_payout_max() -> f64 {
    600.0
}
fn default_agent_count() -> u32 {
    12
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}
fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.check().is_ok());
        assert!(config.start_date < config.end_date);
    }

    #[test]
    fn test_rate_out_of_range_is_rejected() {
        let config = GeneratorConfig {
            missing_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.check(),
            Err(DomainError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_defect_rates_must_fit_in_one_draw() {
        let config = GeneratorConfig {
            missing_rate: 0.4,
            duplicate_rate: 0.4,
            outlier_rate: 0.3,
            ..Default::default()
        };
        assert!(config.defect_rate_total() > 1.0);
        assert!(config.check().is_err());
    }

    #[test]
    fn test_zero_records_and_reversed_ranges() {
        let zero = GeneratorConfig {
            records: 0,
            ..Default::default()
        };
        assert!(zero.check().is_err());

        let dates = GeneratorConfig {
            start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            ..Default::default()
        };
        assert!(dates.check().is_err());

        let payouts = GeneratorConfig {
            payout_min: 900.0,
            ..Default::default()
        };
        assert!(payouts.check().is_err());
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let config: GeneratorConfig = serde_yaml::from_str("insured_rate: .nan\n").unwrap();
        assert!(config.insured_rate.is_nan());
        assert!(matches!(
            config.check(),
            Err(DomainError::ConfigurationError(_))
        ));

        let endless = GeneratorConfig {
            payout_max: f64::INFINITY,
            ..Default::default()
        };
        assert!(endless.check().is_err());
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let config: GeneratorConfig = serde_yaml::from_str("records: 200\nseed: 7\n").unwrap();
        assert_eq!(config.records, 200);
        assert_eq!(config.seed, 7);
        assert_eq!(config.missing_rate, 0.05);
        assert_eq!(config.agent_count, 12);
    }
}
