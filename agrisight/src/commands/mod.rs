// agrisight/src/commands/mod.rs

pub mod check;
pub mod clean;
pub mod dashboard;
pub mod export;
pub mod generate;
pub mod kpi;
pub mod run;

use std::path::Path;

use anyhow::Context;
use agrisight_core::application::{DashboardSession, assess, load_settings, resolve_input};
use agrisight_core::domain::project::ProjectConfig;
use agrisight_core::infrastructure::adapters::DuckDbStore;
use tracing::debug;

use crate::cli::SourceArgs;

pub(crate) fn load_config(project_dir: &Path) -> anyhow::Result<ProjectConfig> {
    println!("⚙️  Loading configuration...");
    let config = load_settings(project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {} (v{})", config.name, config.version);
    Ok(config)
}

pub(crate) fn open_store() -> anyhow::Result<DuckDbStore> {
    DuckDbStore::in_memory().context("Failed to initialize in-memory DuckDB")
}

/// Loads (or synthesises) the survey, runs the rules once and wraps the
/// assessed table in a session.
pub(crate) fn open_session(
    source: &SourceArgs,
) -> anyhow::Result<(ProjectConfig, DuckDbStore, DashboardSession)> {
    let config = load_config(&source.project_dir)?;
    let store = open_store()?;
    let input = resolve_input(&source.project_dir, &config, source.input.as_deref());

    let loaded = assess(&store, &config, input.as_deref()).with_context(|| match &input {
        Some(path) => format!("Failed to assess survey {:?}", path),
        None => "Failed to generate synthetic survey".to_string(),
    })?;
    debug!(
        rows = loaded.report.total(),
        malformed = loaded.malformed_rows,
        "Survey assessed"
    );
    println!("📥 Source: {}", loaded.source);
    if loaded.malformed_rows > 0 {
        println!("⚠️  {} malformed rows skipped", loaded.malformed_rows);
    }

    let session = DashboardSession::new(loaded.report, config.kpi.clone());
    Ok((config, store, session))
}
