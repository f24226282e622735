// agrisight-core/src/application/mod.rs

pub mod clean;
pub mod dashboard;
pub mod pipeline;
pub mod ports;
pub mod session;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write
// `use agrisight_core::application::{run_pipeline, clean_project, DashboardSession};`
// without knowing the file layout.

pub use clean::clean_project;
pub use dashboard::{render_dashboard, write_dashboard};
pub use pipeline::{
    RunResult, SurveySource, assess, check_survey, generate_survey, load_settings, resolve_input,
    run_pipeline,
};
pub use session::{DashboardSession, DashboardView, ExportSummary};
