// agrisight-core/src/domain/kpi/table.rs
//
// Flat layout of KPI breakdowns for CSV export. Rates keep one decimal,
// money is rounded to cents here and nowhere earlier.

use crate::domain::kpi::aggregator::{GroupKpi, KpiSummary};
use crate::domain::kpi::rate::round2;
use crate::domain::survey::FlatTable;

pub const METRIC_COLUMNS: [&str; 8] = [
    "records",
    "unique_farmers",
    "insured",
    "claims",
    "coverage_rate",
    "claim_rate",
    "total_payout",
    "avg_payout_per_claim",
];

pub fn format_rate(rate: Option<f64>) -> Option<String> {
    rate.map(|r| format!("{:.1}", r))
}

pub fn format_money(amount: f64) -> String {
    format!("{:.2}", round2(amount))
}

/// "$30,979.56" style, for terminal tables and the dashboard.
pub fn display_usd(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// "16.8%", or "n/a" when the rate is undefined.
pub fn display_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r))
        .unwrap_or_else(|| "n/a".to_string())
}

fn metric_cells(s: &KpiSummary) -> Vec<Option<String>> {
    vec![
        Some(s.records.to_string()),
        Some(s.unique_farmers.to_string()),
        Some(s.insured.to_string()),
        Some(s.claims.to_string()),
        format_rate(s.coverage_rate),
        format_rate(s.claim_rate),
        Some(format_money(s.total_payout)),
        s.avg_payout_per_claim.map(format_money),
    ]
}

/// One row per group; `key_column` names the grouping column (e.g. "region").
pub fn group_table(key_column: &str, groups: &[GroupKpi]) -> FlatTable {
    let columns: Vec<&str> = std::iter::once(key_column)
        .chain(METRIC_COLUMNS.iter().copied())
        .collect();
    let mut table = FlatTable::new(&columns);
    for group in groups {
        let mut cells = vec![Some(group.key.clone())];
        cells.extend(metric_cells(&group.summary));
        table.push(cells);
    }
    table
}
