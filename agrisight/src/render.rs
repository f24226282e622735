// agrisight/src/render.rs
//
// Terminal tables for the reporting commands.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};

use agrisight_core::domain::kpi::{GroupKpi, KpiSummary, display_rate, display_usd};
use agrisight_core::domain::quality::engine::QualitySummary;

fn base_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn align_right_from(table: &mut Table, first: usize) {
    let count = table.column_count();
    for index in first..count {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// The four headline KPIs plus the volumes behind them.
pub fn kpi_card(kpis: &KpiSummary) -> Table {
    let mut table = base_table(vec!["KPI", "Value"]);
    table.add_row(vec!["Records".to_string(), kpis.records.to_string()]);
    table.add_row(vec!["Unique Farmers".to_string(), kpis.unique_farmers.to_string()]);
    table.add_row(vec!["Coverage Rate".to_string(), display_rate(kpis.coverage_rate)]);
    table.add_row(vec!["Claim Rate".to_string(), display_rate(kpis.claim_rate)]);
    table.add_row(vec!["Total Payout".to_string(), display_usd(kpis.total_payout)]);
    table.add_row(vec![
        "Avg Payout / Claim".to_string(),
        kpis.avg_payout_per_claim
            .map(display_usd)
            .unwrap_or_else(|| "n/a".to_string()),
    ]);
    align_right_from(&mut table, 1);
    table
}

/// One row per group, in the order given.
pub fn group_breakdown(label: &str, groups: &[GroupKpi]) -> Table {
    let mut table = base_table(vec![
        label,
        "Records",
        "Farmers",
        "Insured",
        "Claims",
        "Coverage",
        "Claim Rate",
        "Total Payout",
    ]);
    for group in groups {
        let kpis = &group.summary;
        table.add_row(vec![
            group.key.clone(),
            kpis.records.to_string(),
            kpis.unique_farmers.to_string(),
            kpis.insured.to_string(),
            kpis.claims.to_string(),
            display_rate(kpis.coverage_rate),
            display_rate(kpis.claim_rate),
            display_usd(kpis.total_payout),
        ]);
    }
    align_right_from(&mut table, 1);
    table
}

/// Issue counts per rule, then the clean/flagged split.
pub fn quality_table(quality: &QualitySummary) -> Table {
    let mut table = base_table(vec!["Check", "Records"]);
    for (issue, count) in &quality.issue_counts {
        table.add_row(vec![issue.to_string(), count.to_string()]);
    }
    table.add_row(vec!["clean".to_string(), quality.clean_records.to_string()]);
    table.add_row(vec!["flagged".to_string(), quality.flagged_records.to_string()]);
    table.add_row(vec!["clean rate".to_string(), display_rate(quality.clean_rate)]);
    align_right_from(&mut table, 1);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn summary() -> KpiSummary {
        KpiSummary {
            records: 10,
            unique_farmers: 9,
            insured: 4,
            claims: 1,
            coverage_rate: Some(40.0),
            claim_rate: Some(25.0),
            total_payout: 1234.5,
            avg_payout_per_claim: Some(1234.5),
        }
    }

    #[test]
    fn test_kpi_card_formats_money_and_rates() {
        let rendered = kpi_card(&summary()).to_string();
        assert!(rendered.contains("Claim Rate"));
        assert!(rendered.contains("25.0%"));
        assert!(rendered.contains("$1,234.50"));
    }

    #[test]
    fn test_kpi_card_undefined_values_show_na() {
        let empty = KpiSummary {
            records: 0,
            unique_farmers: 0,
            insured: 0,
            claims: 0,
            coverage_rate: None,
            claim_rate: None,
            total_payout: 0.0,
            avg_payout_per_claim: None,
        };
        let rendered = kpi_card(&empty).to_string();
        assert_eq!(rendered.matches("n/a").count(), 3);
        assert!(rendered.contains("$0.00"));
    }

    #[test]
    fn test_group_breakdown_keeps_given_order() {
        let groups = vec![
            GroupKpi {
                key: "Nyanza".into(),
                summary: summary(),
            },
            GroupKpi {
                key: "Amhara".into(),
                summary: summary(),
            },
        ];
        let rendered = group_breakdown("Region", &groups).to_string();
        let nyanza = rendered.find("Nyanza").unwrap_or(usize::MAX);
        let amhara = rendered.find("Amhara").unwrap_or(0);
        assert!(nyanza < amhara);
    }

    #[test]
    fn test_quality_table_lists_rules() {
        let quality = QualitySummary {
            total_records: 3,
            clean_records: 2,
            flagged_records: 1,
            clean_rate: Some(66.7),
            issue_counts: BTreeMap::new(),
        };
        let rendered = quality_table(&quality).to_string();
        assert!(rendered.contains("clean rate"));
        assert!(rendered.contains("66.7%"));
    }
}
