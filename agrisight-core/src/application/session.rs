// agrisight-core/src/application/session.rs

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::filter::{FilterOptions, SurveyFilter};
use crate::domain::kpi::{
    GroupKpi, GroupOrder, IssueHotspot, KpiAggregator, KpiConfig, KpiSummary, group_table,
    high_issue_regions,
};
use crate::domain::quality::engine::{QualitySummary, assessed_to_table};
use crate::domain::quality::{AssessedRecord, QualityIssue, QualityReport};
use crate::domain::survey::SurveyRecord;
use crate::domain::survey::schema::records_to_table;
use crate::error::AgrisightError;
use crate::ports::store::TableStore;

/// Hotspot regions listed in the data-quality alert.
pub const ALERT_TOP_REGIONS: usize = 5;

pub const CLEAN_EXPORT: &str = "cleaned_survey.csv";
pub const FLAGGED_EXPORT: &str = "flagged_survey.csv";
pub const REGIONAL_EXPORT: &str = "regional_kpis.csv";
pub const AGENT_EXPORT: &str = "agent_kpis.csv";

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub filter: SurveyFilter,
    pub filter_summary: String,
    pub options: FilterOptions,
    /// Rows matching the filter, before the KPI scope is applied.
    pub filtered_records: usize,
    pub quality: QualitySummary,
    pub kpis: KpiSummary,
    /// Alphabetical.
    pub regions: Vec<GroupKpi>,
    pub risk_ranking: Vec<GroupKpi>,
    /// Top agents by volume.
    pub agents: Vec<GroupKpi>,
    pub alerts: Vec<IssueHotspot>,
    pub alert_threshold: usize,
}

impl DashboardView {
    pub fn alert_message(&self) -> String {
        if self.alerts.is_empty() {
            return "Data quality looks good".to_string();
        }
        let regions = self
            .alerts
            .iter()
            .map(|h| format!("{} ({})", h.region, h.records))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "High issue regions (records with more than {} issues): {}",
            self.alert_threshold, regions
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub clean_rows: usize,
    pub flagged_rows: usize,
    pub files: Vec<PathBuf>,
}

/// Holds one assessed table for the lifetime of a dashboard and derives
/// filtered views from it on demand. The table is never mutated.
pub struct DashboardSession {
    report: QualityReport,
    kpi: KpiConfig,
}

impl DashboardSession {
    pub fn new(report: QualityReport, kpi: KpiConfig) -> Self {
        Self { report, kpi }
    }

    pub fn report(&self) -> &QualityReport {
        &self.report
    }

    pub fn kpi_config(&self) -> &KpiConfig {
        &self.kpi
    }

    pub fn options(&self, filter: &SurveyFilter) -> FilterOptions {
        FilterOptions::cascade(self.report.rows.iter().map(|r| &r.record), filter)
    }

    pub fn filtered(&self, filter: &SurveyFilter) -> Vec<&AssessedRecord> {
        filter.apply(&self.report.rows)
    }

    /// Full recomputation for a filter selection.
    #[instrument(skip_all, fields(filter = %filter.describe()))]
    pub fn recompute(&self, filter: &SurveyFilter) -> DashboardView {
        let rows = self.filtered(filter);
        let scoped = self.kpi.scope.select(rows.iter().copied());

        let kpis = KpiAggregator::summarize(scoped.iter().copied());
        let regions = KpiAggregator::order(
            KpiAggregator::by_region(scoped.iter().copied()),
            GroupOrder::Key,
        );
        let risk_ranking = KpiAggregator::order(regions.clone(), GroupOrder::RiskRanking);
        let mut agents = agent_breakdown(&scoped);
        agents.truncate(self.kpi.top_agents);

        let alerts = high_issue_regions(
            rows.iter().copied(),
            self.kpi.high_issue_threshold,
            ALERT_TOP_REGIONS,
        );

        let view = DashboardView {
            filter: filter.clone(),
            filter_summary: filter.describe(),
            options: self.options(filter),
            filtered_records: rows.len(),
            quality: summarize_quality(&rows),
            kpis,
            regions,
            risk_ranking,
            agents,
            alerts,
            alert_threshold: self.kpi.high_issue_threshold,
        };
        info!(
            filtered = view.filtered_records,
            kpi_records = view.kpis.records,
            "Dashboard view recomputed"
        );
        view
    }

    /// Writes the filtered clean table, the filtered flagged table and the
    /// regional / agent KPI tables into `out_dir`.
    #[instrument(skip_all, fields(out_dir = %out_dir.display()))]
    pub fn export(
        &self,
        store: &dyn TableStore,
        out_dir: &Path,
        filter: &SurveyFilter,
    ) -> Result<ExportSummary, AgrisightError> {
        let rows = self.filtered(filter);
        let view = self.recompute(filter);

        let clean: Vec<_> = rows
            .iter()
            .filter(|r| r.is_clean())
            .map(|r| r.record.clone())
            .collect();
        let flagged: Vec<&AssessedRecord> =
            rows.iter().copied().filter(|r| !r.is_clean()).collect();

        let clean_path = out_dir.join(CLEAN_EXPORT);
        let flagged_path = out_dir.join(FLAGGED_EXPORT);
        let regional_path = out_dir.join(REGIONAL_EXPORT);
        let agent_path = out_dir.join(AGENT_EXPORT);

        let clean_rows = store.export_table(&clean_path, &records_to_table(&clean))?;
        let flagged_rows = store.export_table(&flagged_path, &assessed_to_table(flagged))?;
        store.export_table(&regional_path, &group_table("region", &view.risk_ranking))?;
        // Every agent, not just the dashboard's top N.
        let scoped = self.kpi.scope.select(rows.iter().copied());
        store.export_table(&agent_path, &group_table("agent_id", &agent_breakdown(&scoped)))?;

        Ok(ExportSummary {
            clean_rows,
            flagged_rows,
            files: vec![clean_path, flagged_path, regional_path, agent_path],
        })
    }
}

fn agent_breakdown(scoped: &[&SurveyRecord]) -> Vec<GroupKpi> {
    KpiAggregator::order(
        KpiAggregator::by_agent(scoped.iter().copied()),
        GroupOrder::Volume,
    )
}

fn summarize_quality(rows: &[&AssessedRecord]) -> QualitySummary {
    let mut issue_counts: BTreeMap<QualityIssue, usize> =
        QualityIssue::ALL.iter().map(|i| (*i, 0)).collect();
    for row in rows {
        for issue in row.flags.iter() {
            *issue_counts.entry(issue).or_default() += 1;
        }
    }
    let flagged = rows.iter().filter(|r| !r.is_clean()).count();
    QualitySummary::from_counts(rows.len(), flagged, issue_counts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::filter::InsuredStatus;
    use crate::domain::quality::{QualityConfig, QualityEngine};
    use crate::domain::survey::{FlatTable, SurveyRecord};
    use crate::ports::store::LoadedSurvey;
    use std::cell::RefCell;

    fn farm(id: &str, region: &str, agent: &str, insured: bool, claim: bool) -> SurveyRecord {
        SurveyRecord {
            farmer_id: id.into(),
            agent_id: Some(agent.into()),
            country: Some("Kenya".into()),
            region: Some(region.into()),
            crop: Some("Maize".into()),
            latitude: Some(0.3),
            longitude: Some(34.5),
            survey_date: chrono::NaiveDate::from_ymd_opt(2025, 4, 2),
            insured,
            claim_triggered: claim,
            payout_amount_usd: Some(if claim { 200.0 } else { 0.0 }),
            farm_size_ha: Some(2.0),
            yield_kg_per_ha: Some(1500.0),
            household_size: Some(5),
        }
    }

    fn session() -> DashboardSession {
        let mut records = vec![
            farm("F-1", "Nyanza", "AG-001", true, true),
            farm("F-2", "Nyanza", "AG-001", true, false),
            farm("F-3", "Western", "AG-002", false, false),
            farm("F-4", "Western", "AG-002", true, true),
            farm("F-5", "Western", "AG-003", false, false),
        ];
        // Three issues at once: missing crop, uninsured claim, duplicate id.
        let mut messy = farm("F-3", "Western", "AG-003", false, true);
        messy.crop = None;
        records.push(messy);

        let report = QualityEngine::new(QualityConfig::default()).evaluate(records);
        DashboardSession::new(report, KpiConfig::default())
    }

    #[test]
    fn test_unfiltered_view() {
        let view = session().recompute(&SurveyFilter::all());
        assert_eq!(view.filtered_records, 6);
        assert_eq!(view.quality.flagged_records, 1);
        // Clean scope: the messy row is left out of the KPIs.
        assert_eq!(view.kpis.records, 5);
        assert_eq!(view.kpis.insured, 3);
        assert_eq!(view.kpis.claims, 2);
        assert_eq!(view.kpis.claim_rate, Some(66.7));
        assert_eq!(view.regions.iter().map(|g| g.key.as_str()).collect::<Vec<_>>(), vec!["Nyanza", "Western"]);
        assert_eq!(view.risk_ranking[0].key, "Western");
        assert_eq!(view.alerts, vec![IssueHotspot { region: "Western".into(), records: 1 }]);
        assert!(view.alert_message().contains("Western (1)"));
    }

    #[test]
    fn test_filter_recomputes_everything() {
        let session = session();
        let filter = SurveyFilter {
            regions: ["Nyanza".to_string()].into(),
            insured: InsuredStatus::Yes,
            ..Default::default()
        };
        let view = session.recompute(&filter);
        assert_eq!(view.filtered_records, 2);
        assert_eq!(view.kpis.claim_rate, Some(50.0));
        assert_eq!(view.kpis.total_payout, 200.0);
        assert!(view.alerts.is_empty());
        assert_eq!(view.alert_message(), "Data quality looks good");
        assert_eq!(view.agents.len(), 1);
        assert_eq!(view.filter_summary, "region: Nyanza | insured: yes");
    }

    #[test]
    fn test_empty_selection_has_undefined_rates() {
        let filter = SurveyFilter {
            crops: ["Coffee".to_string()].into(),
            ..Default::default()
        };
        let view = session().recompute(&filter);
        assert_eq!(view.filtered_records, 0);
        assert_eq!(view.kpis.coverage_rate, None);
        assert_eq!(view.kpis.claim_rate, None);
        assert_eq!(view.quality.clean_rate, None);
        assert!(view.regions.is_empty());
    }

    #[test]
    fn test_agents_are_capped() {
        let session = DashboardSession::new(
            session().report().clone(),
            KpiConfig {
                top_agents: 2,
                ..Default::default()
            },
        );
        let view = session.recompute(&SurveyFilter::all());
        assert_eq!(view.agents.len(), 2);
        assert_eq!(view.agents[0].key, "AG-001");
    }

    /// Records what would have been written instead of touching disk.
    #[derive(Default)]
    struct MemoryStore {
        written: RefCell<Vec<(PathBuf, FlatTable)>>,
    }

    impl TableStore for MemoryStore {
        fn load_survey(&self, _path: &Path) -> Result<LoadedSurvey, AgrisightError> {
            Ok(LoadedSurvey::default())
        }

        fn export_table(&self, path: &Path, table: &FlatTable) -> Result<usize, AgrisightError> {
            self.written
                .borrow_mut()
                .push((path.to_path_buf(), table.clone()));
            Ok(table.len())
        }

        fn engine_name(&self) -> &str {
            "memory"
        }
    }

    #[test]
    fn test_export_writes_four_tables() {
        let store = MemoryStore::default();
        let summary = session()
            .export(&store, Path::new("out"), &SurveyFilter::all())
            .unwrap();

        assert_eq!(summary.clean_rows, 5);
        assert_eq!(summary.flagged_rows, 1);
        let written = store.written.borrow();
        let names: Vec<String> = written
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![CLEAN_EXPORT, FLAGGED_EXPORT, REGIONAL_EXPORT, AGENT_EXPORT]);

        let flagged = &written[1].1;
        assert_eq!(flagged.columns.last().map(String::as_str), Some("is_clean"));
        let regional = &written[2].1;
        assert_eq!(regional.columns[0], "region");
        // Risk ranking order: Western (100.0%) before Nyanza (50.0%).
        assert_eq!(regional.rows[0][0].as_deref(), Some("Western"));
    }

    #[test]
    fn test_agent_export_is_not_capped() {
        let session = DashboardSession::new(
            session().report().clone(),
            KpiConfig {
                top_agents: 2,
                ..Default::default()
            },
        );
        let store = MemoryStore::default();
        session
            .export(&store, Path::new("out"), &SurveyFilter::all())
            .unwrap();

        let written = store.written.borrow();
        let agents = &written[3].1;
        assert_eq!(agents.columns[0], "agent_id");
        let keys: Vec<_> = agents.rows.iter().map(|r| r[0].as_deref().unwrap()).collect();
        assert_eq!(keys, vec!["AG-001", "AG-002", "AG-003"]);
        assert_eq!(session.recompute(&SurveyFilter::all()).agents.len(), 2);
    }
}
