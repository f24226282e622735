// agrisight/src/commands/dashboard.rs
//
// USE CASE: Render the HTML dashboard for a selection.

use std::path::PathBuf;

use anyhow::Context;
use agrisight_core::application::dashboard::DASHBOARD_FILE;
use agrisight_core::application::render_dashboard;
use agrisight_core::infrastructure::fs::atomic_write;
use agrisight_core::infrastructure::template::JinjaRenderer;

use super::open_session;
use crate::cli::{FilterArgs, SourceArgs};

pub fn execute(
    source: SourceArgs,
    filter: FilterArgs,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (config, _store, session) = open_session(&source)?;
    let view = session.recompute(&filter.to_filter());

    println!("🖥️  Rendering dashboard for {}...", view.filter_summary);
    let html = render_dashboard(&JinjaRenderer::new(), &config.name, &view)
        .context("Failed to render dashboard")?;

    let output = output.unwrap_or_else(|| {
        source
            .project_dir
            .join(&config.target_path)
            .join(DASHBOARD_FILE)
    });
    atomic_write(&output, html)
        .with_context(|| format!("Failed to write dashboard to {:?}", output))?;

    println!("🚨 {}", view.alert_message());
    println!("✨ Dashboard written to {}", output.display());
    Ok(())
}
