// agrisight-core/src/domain/generator/synth.rs

use chrono::Duration;
use rand::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::config::GeneratorConfig;
use crate::domain::error::DomainError;
use crate::domain::survey::{COUNTRIES, CROPS, NumericField, SurveyRecord};

/// Expected answer ranges of a healthy interview.
pub const FARM_SIZE_RANGE: (f64, f64) = (0.5, 5.0);
pub const YIELD_RANGE: (f64, f64) = (500.0, 3500.0);
pub const HOUSEHOLD_RANGE: (u32, u32) = (1, 12);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectedDefect {
    MissingValue,
    Duplicate,
    InvalidGps,
    Outlier,
    InconsistentClaim,
}

/// How many rows received each defect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InjectionStats {
    pub missing_value: usize,
    pub duplicate: usize,
    pub invalid_gps: usize,
    pub outlier: usize,
    pub inconsistent_claim: usize,
}

impl InjectionStats {
    fn record(&mut self, defect: InjectedDefect) {
        match defect {
            InjectedDefect::MissingValue => self.missing_value += 1,
            InjectedDefect::Duplicate => self.duplicate += 1,
            InjectedDefect::InvalidGps => self.invalid_gps += 1,
            InjectedDefect::Outlier => self.outlier += 1,
            InjectedDefect::InconsistentClaim => self.inconsistent_claim += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_value + self.duplicate + self.invalid_gps + self.outlier + self.inconsistent_claim
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedSurvey {
    pub records: Vec<SurveyRecord>,
    pub stats: InjectionStats,
}

/// Seeded synthetic survey source.
///
/// Every row gets at most one defect: a single uniform draw is mapped onto the
/// cumulative defect rates, and whatever is left over yields a clean row.
pub struct SurveyGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SurveyGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, DomainError> {
        config.check()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[instrument(skip(self), fields(records = self.config.records, seed = self.config.seed))]
    pub fn generate(mut self) -> GeneratedSurvey {
        let mut records: Vec<SurveyRecord> = Vec::with_capacity(self.config.records);
        // Rows that carry no injected defect; duplicates copy one of these.
        let mut clean_rows: Vec<usize> = Vec::new();
        let mut stats = InjectionStats::default();
        let mut next_id = 1usize;

        for _ in 0..self.config.records {
            let defect = self.draw_defect();

            if defect == Some(InjectedDefect::Duplicate) && !clean_rows.is_empty() {
                let source = clean_rows[self.rng.gen_range(0..clean_rows.len())];
                let copy = records[source].clone();
                debug!(farmer_id = %copy.farmer_id, "Injected duplicate");
                records.push(copy);
                stats.record(InjectedDefect::Duplicate);
                continue;
            }

            let mut record = self.base_record(next_id);
            next_id += 1;

            match defect {
                Some(InjectedDefect::Duplicate) | None => clean_rows.push(records.len()),
                Some(other) => {
                    self.inject(&mut record, other);
                    stats.record(other);
                }
            }
            records.push(record);
        }

        info!(
            records = records.len(),
            injected = stats.total(),
            "Synthetic survey generated"
        );
        GeneratedSurvey { records, stats }
    }

    fn draw_defect(&mut self) -> Option<InjectedDefect> {
        let c = &self.config;
        let categories = [
            (c.missing_rate, InjectedDefect::MissingValue),
            (c.duplicate_rate, InjectedDefect::Duplicate),
            (c.invalid_gps_rate, InjectedDefect::InvalidGps),
            (c.outlier_rate, InjectedDefect::Outlier),
            (c.inconsistent_claim_rate, InjectedDefect::InconsistentClaim),
        ];
        let draw: f64 = self.rng.r#gen();
        let mut cumulative = 0.0;
        for (rate, defect) in categories {
            cumulative += rate;
            if draw < cumulative {
                return Some(defect);
            }
        }
        None
    }

    fn base_record(&mut self, id: usize) -> SurveyRecord {
        let country = COUNTRIES[self.rng.gen_range(0..COUNTRIES.len())];
        let region = country.regions[self.rng.gen_range(0..country.regions.len())];
        let b = region.bounds;

        let span = (self.config.end_date - self.config.start_date).num_days();
        let survey_date = self.config.start_date + Duration::days(self.rng.gen_range(0..=span));

        let insured = self.rng.gen_bool(self.config.insured_rate);
        let claim_triggered = insured && self.rng.gen_bool(self.config.claim_rate);
        let payout = if claim_triggered { self.payout() } else { 0.0 };

        SurveyRecord {
            farmer_id: format!("F-{:06}", id),
            agent_id: Some(format!(
                "AG-{:03}",
                self.rng.gen_range(1..=self.config.agent_count)
            )),
            country: Some(country.name.to_string()),
            region: Some(region.name.to_string()),
            crop: Some(CROPS[self.rng.gen_range(0..CROPS.len())].to_string()),
            latitude: Some(round_to(self.rng.gen_range(b.min_lat..=b.max_lat), 5)),
            longitude: Some(round_to(self.rng.gen_range(b.min_lon..=b.max_lon), 5)),
            survey_date: Some(survey_date),
            insured,
            claim_triggered,
            payout_amount_usd: Some(payout),
            farm_size_ha: Some(round_to(
                self.rng.gen_range(FARM_SIZE_RANGE.0..=FARM_SIZE_RANGE.1),
                2,
            )),
            yield_kg_per_ha: Some(round_to(
                self.rng.gen_range(YIELD_RANGE.0..=YIELD_RANGE.1),
                1,
            )),
            household_size: Some(self.rng.gen_range(HOUSEHOLD_RANGE.0..=HOUSEHOLD_RANGE.1)),
        }
    }

    /// Whole cents inside the configured payout range.
    fn payout(&mut self) -> f64 {
        let min = (self.config.payout_min * 100.0).round() as i64;
        let max = (self.config.payout_max * 100.0).round() as i64;
        self.rng.gen_range(min.max(1)..=max.max(1)) as f64 / 100.0
    }

    fn inject(&mut self, record: &mut SurveyRecord, defect: InjectedDefect) {
        match defect {
            InjectedDefect::MissingValue => match self.rng.gen_range(0..10) {
                0 => record.agent_id = None,
                1 => record.country = None,
                2 => record.region = None,
                3 => record.crop = None,
                4 => record.latitude = None,
                5 => record.longitude = None,
                6 => record.survey_date = None,
                7 => record.farm_size_ha = None,
                8 => record.yield_kg_per_ha = None,
                _ => record.household_size = None,
            },
            InjectedDefect::InvalidGps => {
                let overshoot = round_to(self.rng.gen_range(0.5..30.0), 5);
                let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                if self.rng.gen_bool(0.5) {
                    record.latitude = Some(sign * (90.0 + overshoot));
                } else {
                    record.longitude = Some(sign * (180.0 + overshoot));
                }
            }
            InjectedDefect::Outlier => {
                let fields = [
                    NumericField::FarmSizeHa,
                    NumericField::YieldKgPerHa,
                    NumericField::HouseholdSize,
                ];
                let m = self.config.outlier_multiplier;
                match fields[self.rng.gen_range(0..fields.len())] {
                    NumericField::FarmSizeHa => {
                        record.farm_size_ha = Some(round_to(FARM_SIZE_RANGE.1 * m, 2))
                    }
                    NumericField::YieldKgPerHa => {
                        record.yield_kg_per_ha = Some(round_to(YIELD_RANGE.1 * m, 1))
                    }
                    _ => {
                        record.household_size =
                            Some((f64::from(HOUSEHOLD_RANGE.1) * m).round() as u32)
                    }
                }
            }
            InjectedDefect::InconsistentClaim => match self.rng.gen_range(0..3) {
                // Claim filed by an uninsured farmer.
                0 => {
                    record.insured = false;
                    record.claim_triggered = true;
                    record.payout_amount_usd = Some(self.payout());
                }
                // Claim with nothing paid.
                1 => {
                    record.insured = true;
                    record.claim_triggered = true;
                    record.payout_amount_usd = Some(0.0);
                }
                // Money out without a claim.
                _ => {
                    record.insured = true;
                    record.claim_triggered = false;
                    record.payout_amount_usd = Some(self.payout());
                }
            },
            InjectedDefect::Duplicate => {}
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::quality::{QualityConfig, QualityEngine, QualityIssue};

    fn generate(config: GeneratorConfig) -> GeneratedSurvey {
        SurveyGenerator::new(config).unwrap().generate()
    }

    fn defect_free(records: usize, seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            records,
            seed,
            missing_rate: 0.0,
            duplicate_rate: 0.0,
            invalid_gps_rate: 0.0,
            outlier_rate: 0.0,
            inconsistent_claim_rate: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_table() {
        let a = generate(GeneratorConfig::default());
        let b = generate(GeneratorConfig::default());
        assert_eq!(a.records, b.records);
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.records.len(), 1500);
    }

    #[test]
    fn test_different_seed_different_table() {
        let a = generate(GeneratorConfig::default());
        let b = generate(GeneratorConfig {
            seed: 7,
            ..Default::default()
        });
        assert_ne!(a.records, b.records);
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let config = GeneratorConfig {
            records: 0,
            ..Default::default()
        };
        assert!(matches!(
            SurveyGenerator::new(config),
            Err(DomainError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_base_records_are_consistent() {
        let survey = generate(defect_free(800, 11));
        assert_eq!(survey.stats.total(), 0);

        for r in &survey.records {
            let country = COUNTRIES
                .iter()
                .find(|c| Some(c.name) == r.country.as_deref())
                .unwrap();
            let region = country
                .regions
                .iter()
                .find(|reg| Some(reg.name) == r.region.as_deref())
                .unwrap();
            assert!(region.bounds.contains(r.latitude.unwrap(), r.longitude.unwrap()));

            let date = r.survey_date.unwrap();
            assert!(date >= survey_dates().0 && date <= survey_dates().1);
            assert!(r.insured || !r.claim_triggered);
            if r.claim_triggered {
                let payout = r.payout();
                assert!((50.0..=600.0).contains(&payout));
                assert_eq!((payout * 100.0).round() / 100.0, payout);
            } else {
                assert_eq!(r.payout(), 0.0);
            }
        }

        let report = QualityEngine::new(QualityConfig::default()).evaluate(survey.records);
        assert_eq!(report.flagged_count(), 0);
    }

    fn survey_dates() -> (chrono::NaiveDate, chrono::NaiveDate) {
        let c = GeneratorConfig::default();
        (c.start_date, c.end_date)
    }

    #[test]
    fn test_agent_ids_follow_pattern() {
        let survey = generate(GeneratorConfig {
            agent_count: 3,
            ..defect_free(300, 5)
        });
        for r in &survey.records {
            let agent = r.agent_id.as_deref().unwrap();
            assert!(["AG-001", "AG-002", "AG-003"].contains(&agent), "{}", agent);
        }
    }

    #[test]
    fn test_defect_fractions_match_configuration() {
        let config = GeneratorConfig {
            records: 4000,
            seed: 99,
            missing_rate: 0.05,
            duplicate_rate: 0.03,
            invalid_gps_rate: 0.02,
            outlier_rate: 0.02,
            inconsistent_claim_rate: 0.03,
            ..Default::default()
        };
        let survey = generate(config.clone());
        let n = survey.records.len() as f64;
        let stats = survey.stats.clone();

        let report = QualityEngine::new(QualityConfig::default()).evaluate(survey.records);
        let counts = &report.issue_counts;

        // One defect per row, and each is caught by exactly its own rule.
        assert_eq!(counts[&QualityIssue::MissingValue], stats.missing_value);
        assert_eq!(counts[&QualityIssue::Duplicate], stats.duplicate);
        assert_eq!(counts[&QualityIssue::InvalidGps], stats.invalid_gps);
        assert_eq!(counts[&QualityIssue::Outlier], stats.outlier);
        assert_eq!(counts[&QualityIssue::InconsistentClaim], stats.inconsistent_claim);
        assert_eq!(report.flagged_count(), stats.total());

        let tolerance = 0.015;
        for (measured, expected) in [
            (stats.missing_value, config.missing_rate),
            (stats.duplicate, config.duplicate_rate),
            (stats.invalid_gps, config.invalid_gps_rate),
            (stats.outlier, config.outlier_rate),
            (stats.inconsistent_claim, config.inconsistent_claim_rate),
        ] {
            let fraction = measured as f64 / n;
            assert!(
                (fraction - expected).abs() < tolerance,
                "measured {} vs configured {}",
                fraction,
                expected
            );
        }
    }

    #[test]
    fn test_duplicates_reuse_an_earlier_id() {
        let survey = generate(GeneratorConfig {
            duplicate_rate: 0.2,
            ..defect_free(500, 3)
        });
        assert!(survey.stats.duplicate > 0);
        let unique: std::collections::HashSet<_> =
            survey.records.iter().map(|r| r.farmer_id.as_str()).collect();
        assert_eq!(unique.len() + survey.stats.duplicate, survey.records.len());
    }
}
