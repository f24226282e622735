// agrisight/src/commands/export.rs
//
// USE CASE: Export the filtered tables and KPI breakdowns as CSV.

use std::path::PathBuf;

use anyhow::Context;

use super::open_session;
use crate::cli::{FilterArgs, SourceArgs};

pub fn execute(
    source: SourceArgs,
    filter: FilterArgs,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (config, store, session) = open_session(&source)?;
    let filter = filter.to_filter();
    let out_dir = out_dir.unwrap_or_else(|| {
        source
            .project_dir
            .join(&config.target_path)
            .join("exports")
    });

    println!("📤 Exporting {}...", filter.describe());
    let summary = session
        .export(&store, &out_dir, &filter)
        .with_context(|| format!("Export to {:?} failed", out_dir))?;

    for file in &summary.files {
        println!("📝 {}", file.display());
    }
    println!(
        "✨ Exported {} clean and {} flagged records",
        summary.clean_rows, summary.flagged_rows
    );
    Ok(())
}
