// agrisight-core/src/domain/kpi/alerts.rs

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::kpi::aggregator::UNKNOWN_GROUP;
use crate::domain::quality::AssessedRecord;

/// A region with records carrying more issues than the alert threshold.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IssueHotspot {
    pub region: String,
    pub records: usize,
}

/// Regions ranked by how many of their records exceed `threshold` issues;
/// at most `top` entries, ties broken alphabetically.
pub fn high_issue_regions<'a, I>(rows: I, threshold: usize, top: usize) -> Vec<IssueHotspot>
where
    I: IntoIterator<Item = &'a AssessedRecord>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        if row.total_issues() > threshold {
            let region = row
                .record
                .region
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or(UNKNOWN_GROUP);
            *counts.entry(region).or_default() += 1;
        }
    }

    let mut hotspots: Vec<IssueHotspot> = counts
        .into_iter()
        .map(|(region, records)| IssueHotspot {
            region: region.to_string(),
            records,
        })
        .collect();
    hotspots.sort_by(|a, b| b.records.cmp(&a.records).then_with(|| a.region.cmp(&b.region)));
    hotspots.truncate(top);
    hotspots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quality::{QualityFlags, QualityIssue};
    use crate::domain::survey::record::fixtures::record;

    fn row(region: &str, issues: &[QualityIssue]) -> AssessedRecord {
        let mut r = record("F-1");
        r.region = Some(region.into());
        AssessedRecord {
            record: r,
            flags: issues.iter().copied().collect::<QualityFlags>(),
        }
    }

    #[test]
    fn test_only_records_above_threshold_count() {
        use QualityIssue::*;
        let rows = vec![
            row("Oromia", &[MissingValue, InvalidGps, Outlier]),
            row("Oromia", &[MissingValue, Duplicate, Outlier, InconsistentClaim]),
            row("Amhara", &[MissingValue, InvalidGps]),
            row("Tigray", &[Duplicate, Outlier, InconsistentClaim]),
        ];
        let hotspots = high_issue_regions(&rows, 2, 5);
        assert_eq!(
            hotspots,
            vec![
                IssueHotspot {
                    region: "Oromia".into(),
                    records: 2
                },
                IssueHotspot {
                    region: "Tigray".into(),
                    records: 1
                },
            ]
        );
    }

    #[test]
    fn test_clean_table_raises_no_alert() {
        let rows = vec![row("Oromia", &[]), row("Amhara", &[QualityIssue::Outlier])];
        assert!(high_issue_regions(&rows, 2, 5).is_empty());
    }
}
