// agrisight/src/commands/generate.rs
//
// USE CASE: Write a synthetic raw survey.

use std::path::PathBuf;

use anyhow::Context;
use agrisight_core::application::generate_survey;
use agrisight_core::application::pipeline::RAW_SURVEY;

use super::{load_config, open_store};

pub fn execute(
    project_dir: PathBuf,
    records: Option<usize>,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = load_config(&project_dir)?;
    if let Some(records) = records {
        config.generator.records = records;
    }
    if let Some(seed) = seed {
        config.generator.seed = seed;
    }

    let output = output.unwrap_or_else(|| project_dir.join(&config.target_path).join(RAW_SURVEY));
    println!(
        "🎲 Generating {} synthetic records (seed {})...",
        config.generator.records, config.generator.seed
    );

    let store = open_store()?;
    let survey = generate_survey(&store, &config.generator, &output)
        .with_context(|| format!("Failed to generate survey into {:?}", output))?;

    println!(
        "   Injected defects: {} missing, {} gps, {} duplicate, {} outlier, {} inconsistent",
        survey.stats.missing_value,
        survey.stats.invalid_gps,
        survey.stats.duplicate,
        survey.stats.outlier,
        survey.stats.inconsistent_claim
    );
    println!("✨ Wrote {} records to {}", survey.records.len(), output.display());
    Ok(())
}
