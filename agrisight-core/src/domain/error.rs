// agrisight-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, PartialEq)]
pub enum DomainError {
    #[error("Configuration Error: {0}")]
    #[diagnostic(
        code(agrisight::domain::configuration),
        help("Check the generator / quality / kpi sections of agrisight.yaml.")
    )]
    ConfigurationError(String),

    #[error("Malformed input at row {row}: {reason}")]
    #[diagnostic(
        code(agrisight::domain::malformed_input),
        help("The row is skipped and counted; fix the source file to include it.")
    )]
    MalformedInput { row: usize, reason: String },

    #[error("Division undefined for '{metric}': denominator is zero")]
    #[diagnostic(code(agrisight::domain::division_undefined))]
    DivisionUndefined { metric: String },

    #[error("Schema Error: {0}")]
    #[diagnostic(
        code(agrisight::domain::schema),
        help("The survey file header must list every survey record column.")
    )]
    SchemaError(String),
}
