// agrisight-core/src/domain/quality/config.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::survey::{GeoBounds, NumericField};

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
#[validate(schema(function = "validate_quality_config"))]
pub struct QualityConfig {
    /// Outlier threshold: a value outside mean ± k·stddev is flagged.
    #[serde(default = "default_outlier_k")]
    #[validate(range(exclusive_min = 0.0))]
    pub outlier_k: f64,

    #[serde(default = "default_outlier_fields")]
    pub outlier_fields: Vec<NumericField>,

    /// Optional study-area box on top of the global coordinate range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_area: Option<GeoBounds>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            outlier_k: default_outlier_k(),
            outlier_fields: default_outlier_fields(),
            study_area: None,
        }
    }
}

fn default_outlier_k() -> f64 {
    3.0
}

fn default_outlier_fields() -> Vec<NumericField> {
    vec![
        NumericField::FarmSizeHa,
        NumericField::YieldKgPerHa,
        NumericField::HouseholdSize,
    ]
}

fn validate_quality_config(config: &QualityConfig) -> Result<(), ValidationError> {
    if !config.outlier_k.is_finite() {
        return Err(ValidationError::new("outlier_k_not_finite"));
    }
    if let Some(area) = &config.study_area
        && !area.is_well_formed()
    {
        return Err(ValidationError::new("study_area_malformed"));
    }
    Ok(())
}
