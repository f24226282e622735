// agrisight-core/src/domain/quality/outlier.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OutlierError {
    #[error(
        "Outlier on '{field}': z-score {z_score:.2} exceeds k = {k:.2}. Mean {mean:.4}, StdDev {stddev:.4}, Value {value:.4}"
    )]
    OutlierDetected {
        field: String,
        z_score: f64,
        k: f64,
        value: f64,
        mean: f64,
        stddev: f64,
    },
    #[error("Not enough values for an outlier check on '{0}' (need at least 2)")]
    NotEnoughData(String),
}

/// Running mean / population variance of one numeric column.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct FieldStats {
    pub mean: f64,
    pub variance: f64,
    pub count: u64,
}

impl FieldStats {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        values.into_iter().fold(Self::default(), |s, v| s.push(v))
    }

    /// Welford's online update.
    pub fn push(mut self, value: f64) -> Self {
        self.count += 1;
        if self.count == 1 {
            self.mean = value;
            self.variance = 0.0;
        } else {
            let old_mean = self.mean;
            self.mean += (value - old_mean) / (self.count as f64);
            // M2_new = M2_old + (x - old_mean) * (x - new_mean)
            let prev_m2 = self.variance * (self.count - 1) as f64;
            let new_m2 = prev_m2 + (value - old_mean) * (value - self.mean);
            self.variance = new_m2 / self.count as f64;
        }
        self
    }

    pub fn stddev(&self) -> f64 {
        self.variance.sqrt()
    }
}

pub struct OutlierCheck;

impl OutlierCheck {
    /// Checks a value against the column distribution it belongs to.
    /// A column without spread (stddev ~ 0) never flags.
    pub fn validate(field: &str, value: f64, stats: &FieldStats, k: f64) -> Result<(), OutlierError> {
        if stats.count < 2 {
            return Err(OutlierError::NotEnoughData(field.to_string()));
        }

        let stddev = stats.stddev();
        if stddev > 1e-9 {
            let z_score = ((value - stats.mean) / stddev).abs();
            if z_score > k {
                return Err(OutlierError::OutlierDetected {
                    field: field.to_string(),
                    z_score,
                    k,
                    value,
                    mean: stats.mean,
                    stddev,
                });
            }
        }
        Ok(())
    }

    pub fn is_outlier(field: &str, value: f64, stats: &FieldStats, k: f64) -> bool {
        matches!(
            Self::validate(field, value, stats, k),
            Err(OutlierError::OutlierDetected { .. })
        )
    }
}
