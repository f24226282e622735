// agrisight-core/src/domain/kpi/rate.rs

use crate::domain::error::DomainError;

/// Cents, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator` as a percentage rounded to one decimal.
///
/// Counts are never negative, so half away from zero is half up. The
/// rounding is done on integers: ties like 23/80 = 28.75% must not slip
/// below the half through float error.
pub fn percentage(metric: &str, numerator: usize, denominator: usize) -> Result<f64, DomainError> {
    if denominator == 0 {
        return Err(DomainError::DivisionUndefined {
            metric: metric.to_string(),
        });
    }
    let (n, d) = (numerator as u128, denominator as u128);
    let tenths = (2 * n * 1000 + d) / (2 * d);
    Ok(tenths as f64 / 10.0)
}
