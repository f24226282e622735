// agrisight-core/src/domain/generator/mod.rs

pub mod config;
pub mod synth;

pub use config::GeneratorConfig;
pub use synth::{GeneratedSurvey, InjectedDefect, InjectionStats, SurveyGenerator};
