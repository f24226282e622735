// agrisight/src/main.rs

use clap::Parser;

mod cli;
mod commands;
mod render;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG is not read; logs go to stderr so tables on stdout stay pipeable.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        // --- USE CASE: SYNTHETIC SURVEY ---
        Commands::Generate {
            project_dir,
            records,
            seed,
            output,
        } => commands::generate::execute(project_dir, records, seed, output),

        // --- USE CASE: QUALITY CHECK ---
        Commands::Check { source, out_dir } => commands::check::execute(source, out_dir),

        // --- USE CASE: KPI BREAKDOWN ---
        Commands::Kpi {
            source,
            filter,
            by,
            order,
        } => commands::kpi::execute(source, filter, by, order),

        // --- USE CASE: HTML DASHBOARD ---
        Commands::Dashboard {
            source,
            filter,
            output,
        } => commands::dashboard::execute(source, filter, output),

        // --- USE CASE: FILTERED EXPORTS ---
        Commands::Export {
            source,
            filter,
            out_dir,
        } => commands::export::execute(source, filter, out_dir),

        // --- USE CASE: RUN PIPELINE ---
        Commands::Run { source } => commands::run::execute(source),

        // --- USE CASE: CLEAN ---
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
