pub mod error;
pub mod filter;
pub mod generator;
pub mod kpi;
pub mod project;
pub mod quality;
pub mod survey;

pub use error::DomainError;
