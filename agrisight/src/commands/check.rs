// agrisight/src/commands/check.rs
//
// USE CASE: Apply the SOP quality rules to a raw survey CSV.

use std::path::PathBuf;

use anyhow::{Context, bail};
use agrisight_core::application::{check_survey, resolve_input};

use super::{load_config, open_store};
use crate::cli::SourceArgs;
use crate::render::quality_table;

pub fn execute(source: SourceArgs, out_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(&source.project_dir)?;
    let Some(input) = resolve_input(&source.project_dir, &config, source.input.as_deref()) else {
        bail!("No survey to check: pass --input or set `input` in the project config");
    };
    let out_dir = out_dir.unwrap_or_else(|| source.project_dir.join(&config.target_path));

    println!("🔎 Applying quality rules to {}...", input.display());
    let store = open_store()?;
    let outcome = check_survey(&store, &input, &config.quality, &out_dir)
        .with_context(|| format!("Quality check failed for {:?}", input))?;

    let quality = outcome.report.summary();
    println!("{}", quality_table(&quality));
    if outcome.malformed_rows > 0 {
        println!("⚠️  {} malformed rows skipped", outcome.malformed_rows);
    }
    println!("📝 Flagged table: {}", outcome.flagged_path.display());
    println!("📝 Cleaned table: {}", outcome.cleaned_path.display());
    println!(
        "✨ {} of {} records clean",
        quality.clean_records, quality.total_records
    );
    Ok(())
}
