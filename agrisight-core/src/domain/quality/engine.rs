// agrisight-core/src/domain/quality/engine.rs

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

use crate::domain::kpi::rate::percentage;
use crate::domain::quality::config::QualityConfig;
use crate::domain::quality::duplicate::DuplicateTracker;
use crate::domain::quality::flag::{QualityFlags, QualityIssue};
use crate::domain::quality::outlier::{FieldStats, OutlierCheck};
use crate::domain::quality::rules;
use crate::domain::survey::schema::{self, FlatTable, SURVEY_COLUMNS};
use crate::domain::survey::{NumericField, SurveyRecord};

pub const FLAG_COLUMNS: [&str; 3] = ["quality_flags", "total_issues", "is_clean"];

#[derive(Debug, Clone, PartialEq)]
pub struct AssessedRecord {
    pub record: SurveyRecord,
    pub flags: QualityFlags,
}

impl AssessedRecord {
    pub fn is_clean(&self) -> bool {
        self.flags.is_clean()
    }

    pub fn total_issues(&self) -> usize {
        self.flags.len()
    }
}

/// Rule engine output: the augmented table plus its roll-up.
#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    pub rows: Vec<AssessedRecord>,
    pub issue_counts: BTreeMap<QualityIssue, usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QualitySummary {
    pub total_records: usize,
    pub clean_records: usize,
    pub flagged_records: usize,
    /// Percentage, one decimal. None for an empty table.
    pub clean_rate: Option<f64>,
    pub issue_counts: BTreeMap<QualityIssue, usize>,
}

impl QualitySummary {
    /// Display clean rate comes from the integer counts, rounded once.
    pub fn from_counts(
        total: usize,
        flagged: usize,
        issue_counts: BTreeMap<QualityIssue, usize>,
    ) -> Self {
        let clean = total - flagged;
        Self {
            total_records: total,
            clean_records: clean,
            flagged_records: flagged,
            clean_rate: percentage("clean_rate", clean, total).ok(),
            issue_counts,
        }
    }
}

impl QualityReport {
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn flagged_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_clean()).count()
    }

    /// Exact clean rate in percent: 100 · (1 − flagged / total).
    pub fn clean_rate(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        Some(100.0 * (1.0 - self.flagged_count() as f64 / self.total() as f64))
    }

    pub fn clean_records(&self) -> Vec<SurveyRecord> {
        self.rows
            .iter()
            .filter(|r| r.is_clean())
            .map(|r| r.record.clone())
            .collect()
    }

    pub fn summary(&self) -> QualitySummary {
        QualitySummary::from_counts(self.total(), self.flagged_count(), self.issue_counts.clone())
    }

    pub fn to_flat_table(&self) -> FlatTable {
        assessed_to_table(self.rows.iter())
    }
}

/// Survey columns followed by the flag columns.
pub fn assessed_to_table<'a, I>(rows: I) -> FlatTable
where
    I: IntoIterator<Item = &'a AssessedRecord>,
{
    let columns: Vec<&str> = SURVEY_COLUMNS.iter().chain(FLAG_COLUMNS.iter()).copied().collect();
    let mut table = FlatTable::new(&columns);
    for row in rows {
        let mut cells = schema::record_cells(&row.record);
        cells.push(Some(row.flags.to_string()).filter(|s| !s.is_empty()));
        cells.push(Some(row.total_issues().to_string()));
        cells.push(Some(schema::yes_no(row.is_clean()).to_string()));
        table.push(cells);
    }
    table
}

pub struct QualityEngine {
    config: QualityConfig,
}

impl QualityEngine {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Runs the SOP rule set over the whole table.
    ///
    /// Two passes: the first gathers the cross-record state (seen ids are
    /// tracked inline, column statistics up front), the second applies every
    /// rule to every row. Row order is preserved.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn evaluate(&self, records: Vec<SurveyRecord>) -> QualityReport {
        let stats = self.column_stats(&records);
        let duplicates = DuplicateTracker::flag_all(&records);
        let study_area = self.config.study_area.as_ref();

        let mut issue_counts: BTreeMap<QualityIssue, usize> =
            QualityIssue::ALL.iter().map(|i| (*i, 0)).collect();

        let rows: Vec<AssessedRecord> = records
            .into_iter()
            .zip(duplicates)
            .map(|(record, is_duplicate)| {
                let mut flags = QualityFlags::default();

                if rules::has_missing_value(&record) {
                    flags.insert(QualityIssue::MissingValue);
                }
                if rules::has_invalid_gps(&record, study_area) {
                    flags.insert(QualityIssue::InvalidGps);
                }
                if is_duplicate {
                    flags.insert(QualityIssue::Duplicate);
                }
                if self.has_outlier(&record, &stats) {
                    flags.insert(QualityIssue::Outlier);
                }
                if rules::has_inconsistent_claim(&record) {
                    flags.insert(QualityIssue::InconsistentClaim);
                }

                for issue in flags.iter() {
                    *issue_counts.entry(issue).or_default() += 1;
                }
                if !flags.is_clean() {
                    debug!(farmer_id = %record.farmer_id, flags = %flags, "Record flagged");
                }
                AssessedRecord { record, flags }
            })
            .collect();

        let report = QualityReport { rows, issue_counts };
        info!(
            total = report.total(),
            flagged = report.flagged_count(),
            clean_rate = ?report.clean_rate(),
            "Quality rules applied"
        );
        report
    }

    fn column_stats(&self, records: &[SurveyRecord]) -> HashMap<NumericField, FieldStats> {
        self.config
            .outlier_fields
            .iter()
            .map(|field| {
                let stats = FieldStats::from_values(records.iter().filter_map(|r| r.numeric(*field)));
                debug!(%field, mean = stats.mean, stddev = stats.stddev(), n = stats.count, "Column statistics");
                (*field, stats)
            })
            .collect()
    }

    fn has_outlier(&self, record: &SurveyRecord, stats: &HashMap<NumericField, FieldStats>) -> bool {
        self.config.outlier_fields.iter().any(|field| {
            match (record.numeric(*field), stats.get(field)) {
                (Some(value), Some(s)) => {
                    OutlierCheck::is_outlier(field.as_str(), value, s, self.config.outlier_k)
                }
                _ => false,
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::quality::deduplicate;
    use crate::domain::survey::record::fixtures::*;

    fn engine() -> QualityEngine {
        QualityEngine::new(QualityConfig::default())
    }

    /// Twenty ordinary farms with a bit of spread so the outlier rule has a distribution.
    fn baseline(n: usize) -> Vec<SurveyRecord> {
        (0..n)
            .map(|i| {
                let mut r = record(&format!("F-{:03}", i));
                r.farm_size_ha = Some(1.0 + (i % 5) as f64 * 0.5);
                r.yield_kg_per_ha = Some(1500.0 + (i % 7) as f64 * 100.0);
                r.household_size = Some(3 + (i % 6) as u32);
                r
            })
            .collect()
    }

    #[test]
    fn test_clean_table_is_fully_clean() {
        let report = engine().evaluate(baseline(20));
        assert_eq!(report.flagged_count(), 0);
        assert_eq!(report.clean_rate(), Some(100.0));
        assert!(report.issue_counts.values().all(|c| *c == 0));
    }

    #[test]
    fn test_claim_without_insurance_flagged_inconsistent() {
        let mut records = baseline(10);
        records[4].claim_triggered = true;
        records[4].insured = false;
        records[4].payout_amount_usd = Some(300.0);

        let report = engine().evaluate(records);
        assert!(report.rows[4].flags.contains(QualityIssue::InconsistentClaim));
        assert_eq!(report.issue_counts[&QualityIssue::InconsistentClaim], 1);
    }

    #[test]
    fn test_shared_id_flags_only_the_second_row() {
        let mut records = baseline(10);
        records[7].farmer_id = records[2].farmer_id.clone();

        let report = engine().evaluate(records);
        assert!(!report.rows[2].flags.contains(QualityIssue::Duplicate));
        assert!(report.rows[2].is_clean());
        assert!(report.rows[7].flags.contains(QualityIssue::Duplicate));
    }

    #[test]
    fn test_outlier_beyond_k_sigma() {
        let mut records = baseline(40);
        records[13].farm_size_ha = Some(250.0);

        let report = engine().evaluate(records);
        assert_eq!(report.issue_counts[&QualityIssue::Outlier], 1);
        assert!(report.rows[13].flags.contains(QualityIssue::Outlier));
    }

    #[test]
    fn test_flags_accumulate_per_record() {
        let mut records = baseline(10);
        records[0].latitude = Some(123.0);
        records[0].crop = None;

        let report = engine().evaluate(records);
        assert_eq!(report.rows[0].flags.to_string(), "missing_value;invalid_gps");
        assert_eq!(report.rows[0].total_issues(), 2);
    }

    #[test]
    fn test_clean_rate_is_exact_complement() {
        let mut records = baseline(12);
        records[1].region = None;
        records[5].longitude = Some(200.0);
        records[9].farmer_id = records[3].farmer_id.clone();

        let report = engine().evaluate(records);
        let expected = 100.0 * (1.0 - 3.0 / 12.0);
        assert_eq!(report.clean_rate(), Some(expected));
        let summary = report.summary();
        assert_eq!(summary.flagged_records, 3);
        assert_eq!(summary.clean_records, 9);
        assert_eq!(summary.clean_rate, Some(75.0));
    }

    #[test]
    fn test_summary_clean_rate_rounds_ties_up() {
        // 23 clean of 80: exactly 28.75%.
        let summary = QualitySummary::from_counts(80, 57, BTreeMap::new());
        assert_eq!(summary.clean_records, 23);
        assert_eq!(summary.clean_rate, Some(28.8));
    }

    #[test]
    fn test_empty_table_has_no_clean_rate() {
        let report = engine().evaluate(vec![]);
        assert_eq!(report.clean_rate(), None);
        assert_eq!(report.summary().clean_rate, None);
    }

    #[test]
    fn test_duplicate_check_on_deduplicated_output_flags_nothing() {
        let mut records = baseline(15);
        records[10].farmer_id = records[0].farmer_id.clone();
        records[11].farmer_id = records[0].farmer_id.clone();
        records[12].farmer_id = records[4].farmer_id.clone();

        let deduped = deduplicate(&records);
        let report = engine().evaluate(deduped);
        assert_eq!(report.issue_counts[&QualityIssue::Duplicate], 0);
    }

    #[test]
    fn test_flat_table_carries_flag_columns() {
        let mut records = baseline(3);
        records[2].farmer_id = records[0].farmer_id.clone();
        let table = engine().evaluate(records).to_flat_table();

        assert_eq!(table.columns.len(), SURVEY_COLUMNS.len() + 3);
        assert_eq!(table.columns.last().map(String::as_str), Some("is_clean"));
        let last = table.rows.last().unwrap();
        assert_eq!(last[14].as_deref(), Some("duplicate"));
        assert_eq!(last[15].as_deref(), Some("1"));
        assert_eq!(last[16].as_deref(), Some("No"));
        assert_eq!(table.rows[0][14], None);
    }
}
