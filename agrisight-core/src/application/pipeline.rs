// agrisight-core/src/application/pipeline.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::application::dashboard::write_dashboard;
use crate::application::ports::TemplateEngine;
use crate::application::session::{CLEAN_EXPORT, DashboardSession, FLAGGED_EXPORT};
use crate::domain::filter::SurveyFilter;
use crate::domain::generator::{GeneratedSurvey, GeneratorConfig, InjectionStats, SurveyGenerator};
use crate::domain::kpi::{KpiScope, KpiSummary};
use crate::domain::project::ProjectConfig;
use crate::domain::quality::engine::QualitySummary;
use crate::domain::quality::{QualityConfig, QualityEngine, QualityReport};
use crate::domain::survey::schema::records_to_table;
use crate::error::AgrisightError;
use crate::infrastructure::config::load_or_default;
use crate::infrastructure::fs::atomic_write;
use crate::ports::store::TableStore;

pub const RAW_SURVEY: &str = "raw_survey.csv";
pub const RUN_RESULTS: &str = "run_results.json";

/// Effective project configuration, validated.
pub fn load_settings(project_dir: &Path) -> Result<ProjectConfig, AgrisightError> {
    let config = load_or_default(project_dir)?;
    config.check()?;
    Ok(config)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SurveySource {
    File { path: PathBuf },
    Generated { records: usize, seed: u64 },
}

impl fmt::Display for SurveySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path } => write!(f, "{}", path.display()),
            Self::Generated { records, seed } => {
                write!(f, "synthetic ({} records, seed {})", records, seed)
            }
        }
    }
}

/// Input file given on the command line, else the configured one
/// (relative to the project), else none.
pub fn resolve_input(project_dir: &Path, config: &ProjectConfig, cli: Option<&Path>) -> Option<PathBuf> {
    cli.map(Path::to_path_buf)
        .or_else(|| config.input.as_ref().map(|p| project_dir.join(p)))
}

/// Generates a synthetic survey and writes it as CSV.
#[instrument(skip(store, config), fields(records = config.records, seed = config.seed))]
pub fn generate_survey(
    store: &dyn TableStore,
    config: &GeneratorConfig,
    output: &Path,
) -> Result<GeneratedSurvey, AgrisightError> {
    let survey = SurveyGenerator::new(config.clone())?.generate();
    store.export_table(output, &records_to_table(&survey.records))?;
    info!(path = %output.display(), "Raw survey written");
    Ok(survey)
}

/// Assessed table plus what it took to get there.
pub struct LoadedAssessment {
    pub source: SurveySource,
    pub report: QualityReport,
    pub malformed_rows: usize,
    pub injected: Option<InjectionStats>,
}

/// Reads `input` (or generates in memory when there is none) and runs the rule engine.
pub fn assess(
    store: &dyn TableStore,
    config: &ProjectConfig,
    input: Option<&Path>,
) -> Result<LoadedAssessment, AgrisightError> {
    let (records, source, malformed_rows, injected) = match input {
        Some(path) => {
            let loaded = store.load_survey(path)?;
            let malformed = loaded.malformed_count();
            (
                loaded.records,
                SurveySource::File {
                    path: path.to_path_buf(),
                },
                malformed,
                None,
            )
        }
        None => {
            let survey = SurveyGenerator::new(config.generator.clone())?.generate();
            (
                survey.records,
                SurveySource::Generated {
                    records: config.generator.records,
                    seed: config.generator.seed,
                },
                0,
                Some(survey.stats),
            )
        }
    };

    let report = QualityEngine::new(config.quality.clone()).evaluate(records);
    Ok(LoadedAssessment {
        source,
        report,
        malformed_rows,
        injected,
    })
}

pub struct CheckOutcome {
    pub report: QualityReport,
    pub malformed_rows: usize,
    pub flagged_path: PathBuf,
    pub cleaned_path: PathBuf,
}

/// Runs the SOP rules over a CSV and writes the flagged and cleaned tables.
#[instrument(skip(store, quality), fields(input = %input.display()))]
pub fn check_survey(
    store: &dyn TableStore,
    input: &Path,
    quality: &QualityConfig,
    out_dir: &Path,
) -> Result<CheckOutcome, AgrisightError> {
    let loaded = store.load_survey(input)?;
    let malformed_rows = loaded.malformed_count();
    let report = QualityEngine::new(quality.clone()).evaluate(loaded.records);

    let flagged_path = out_dir.join(FLAGGED_EXPORT);
    let cleaned_path = out_dir.join(CLEAN_EXPORT);
    store.export_table(&flagged_path, &report.to_flat_table())?;
    store.export_table(&cleaned_path, &records_to_table(&report.clean_records()))?;

    Ok(CheckOutcome {
        report,
        malformed_rows,
        flagged_path,
        cleaned_path,
    })
}

#[derive(Debug, Serialize)]
pub struct RunResult {
    pub success: bool,
    pub project: String,
    pub generated_at: String,
    pub source: SurveySource,
    pub malformed_rows: usize,
    pub quality: QualitySummary,
    pub kpi_scope: KpiScope,
    pub kpis: KpiSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injected: Option<InjectionStats>,
    pub artifacts: Vec<PathBuf>,
}

/// generate (or read) → rules → KPIs → exports, dashboard and run results.
#[instrument(skip_all, fields(project = %config.name))]
pub fn run_pipeline(
    store: &dyn TableStore,
    template_engine: &dyn TemplateEngine,
    project_dir: &Path,
    config: &ProjectConfig,
    input: Option<&Path>,
) -> Result<RunResult, AgrisightError> {
    println!("🚀 Starting survey pipeline...");
    let start_time = std::time::Instant::now();

    let target_dir = project_dir.join(&config.target_path);
    if !target_dir.exists() {
        fs::create_dir_all(&target_dir)?;
    }

    // 1. SOURCE
    let mut injected = None;
    let input_path = match resolve_input(project_dir, config, input) {
        Some(path) => path,
        None => {
            let raw_path = target_dir.join(RAW_SURVEY);
            println!(
                "🎲 Generating {} synthetic records (seed {})...",
                config.generator.records, config.generator.seed
            );
            injected = Some(generate_survey(store, &config.generator, &raw_path)?.stats);
            raw_path
        }
    };

    // 2. RULES
    println!("🔎 Applying quality rules to {}...", input_path.display());
    let loaded = store.load_survey(&input_path)?;
    let malformed_rows = loaded.malformed_count();
    let report = QualityEngine::new(config.quality.clone()).evaluate(loaded.records);
    let quality = report.summary();

    // 3. KPIs + EXPORTS
    println!("📊 Aggregating KPIs ({:?} scope)...", config.kpi.scope);
    let session = DashboardSession::new(report, config.kpi.clone());
    let view = session.recompute(&SurveyFilter::all());
    let exports = session.export(store, &target_dir, &SurveyFilter::all())?;

    // 4. DASHBOARD
    let dashboard = write_dashboard(template_engine, &config.name, &view, &target_dir)?;

    let mut artifacts = exports.files;
    artifacts.push(dashboard);
    let results_path = target_dir.join(RUN_RESULTS);
    artifacts.push(results_path.clone());

    let source = if injected.is_some() {
        SurveySource::Generated {
            records: config.generator.records,
            seed: config.generator.seed,
        }
    } else {
        SurveySource::File {
            path: input_path.clone(),
        }
    };

    let result = RunResult {
        success: true,
        project: config.name.clone(),
        generated_at: Utc::now().to_rfc3339(),
        source,
        malformed_rows,
        quality,
        kpi_scope: config.kpi.scope,
        kpis: view.kpis,
        injected,
        artifacts,
    };

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| AgrisightError::Infrastructure(e.into()))?;
    atomic_write(&results_path, json)?;

    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Pipeline finished");
    println!("✨ Pipeline completed in {:.2?}", start_time.elapsed());
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::duckdb::DuckDbStore;
    use crate::infrastructure::template::JinjaRenderer;
    use anyhow::Result;
    use tempfile::tempdir;

    fn small_project() -> ProjectConfig {
        let mut config = ProjectConfig {
            name: "pipeline-test".into(),
            ..Default::default()
        };
        config.generator.records = 400;
        config.generator.seed = 42;
        config
    }

    #[test]
    fn test_run_pipeline_writes_every_artifact() -> Result<()> {
        let dir = tempdir()?;
        let store = DuckDbStore::in_memory()?;
        let config = small_project();

        let result = run_pipeline(&store, &JinjaRenderer::new(), dir.path(), &config, None)?;

        assert!(result.success);
        assert_eq!(result.malformed_rows, 0);
        assert_eq!(result.quality.total_records, 400);
        assert!(result.injected.is_some());
        for name in [
            RAW_SURVEY,
            CLEAN_EXPORT,
            FLAGGED_EXPORT,
            "regional_kpis.csv",
            "agent_kpis.csv",
            "dashboard.html",
            RUN_RESULTS,
        ] {
            assert!(dir.path().join("target").join(name).exists(), "{}", name);
        }

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("target").join(RUN_RESULTS))?)?;
        assert_eq!(json["source"]["kind"], "generated");
        assert_eq!(json["kpi_scope"], "clean");
        assert_eq!(json["quality"]["total_records"], 400);
        Ok(())
    }

    #[test]
    fn test_generated_run_is_reproducible() -> Result<()> {
        let store = DuckDbStore::in_memory()?;
        let config = small_project();
        let a = run_pipeline(&store, &JinjaRenderer::new(), tempdir()?.path(), &config, None)?;
        let b = run_pipeline(&store, &JinjaRenderer::new(), tempdir()?.path(), &config, None)?;
        assert_eq!(a.quality, b.quality);
        assert_eq!(a.kpis, b.kpis);
        Ok(())
    }

    #[test]
    fn test_check_matches_in_memory_assessment() -> Result<()> {
        let dir = tempdir()?;
        let store = DuckDbStore::in_memory()?;
        let config = small_project();
        let raw = dir.path().join(RAW_SURVEY);
        generate_survey(&store, &config.generator, &raw)?;

        let checked = check_survey(&store, &raw, &config.quality, dir.path())?;
        let direct = assess(&store, &config, None)?;

        assert_eq!(checked.report.summary(), direct.report.summary());
        assert!(checked.flagged_path.exists());
        let cleaned = store.load_survey(&checked.cleaned_path)?;
        assert_eq!(cleaned.records.len(), checked.report.total() - checked.report.flagged_count());
        Ok(())
    }

    #[test]
    fn test_invalid_settings_fail_fast() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("agrisight.yaml"),
            "name: bad\nversion: '1'\ngenerator:\n  missing_rate: 0.9\n  duplicate_rate: 0.9\n",
        )?;
        let err = load_settings(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AgrisightError::Domain(crate::domain::error::DomainError::ConfigurationError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_input_resolution_prefers_cli() {
        let config = ProjectConfig {
            input: Some("data/raw.csv".into()),
            ..Default::default()
        };
        let project = Path::new("/proj");
        assert_eq!(
            resolve_input(project, &config, Some(Path::new("other.csv"))),
            Some(PathBuf::from("other.csv"))
        );
        assert_eq!(
            resolve_input(project, &config, None),
            Some(PathBuf::from("/proj/data/raw.csv"))
        );
        assert_eq!(resolve_input(project, &ProjectConfig::default(), None), None);
    }
}
