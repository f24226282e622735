// agrisight/src/commands/run.rs
//
// USE CASE: Run the full survey pipeline.

use agrisight_core::application::run_pipeline;
use agrisight_core::infrastructure::template::JinjaRenderer;
use agrisight_core::ports::store::TableStore;

use super::{load_config, open_store};
use crate::cli::SourceArgs;
use crate::render::{kpi_card, quality_table};

pub fn execute(source: SourceArgs) -> anyhow::Result<()> {
    let config = load_config(&source.project_dir)?;
    let store = open_store()?;
    println!("   Engine: {} 🦆", store.engine_name());

    let template_engine = JinjaRenderer::new();
    let result = run_pipeline(
        &store,
        &template_engine,
        &source.project_dir,
        &config,
        source.input.as_deref(),
    );

    match result {
        Ok(run_res) => {
            println!("{}", quality_table(&run_res.quality));
            println!("{}", kpi_card(&run_res.kpis));
            if run_res.malformed_rows > 0 {
                println!("⚠️  {} malformed rows skipped", run_res.malformed_rows);
            }
            for artifact in &run_res.artifacts {
                println!("📝 {}", artifact.display());
            }
            println!("\n✨ SUCCESS! Survey from {} processed.", run_res.source);
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL PIPELINE ERROR: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
