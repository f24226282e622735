// agrisight-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)] // Public API is documented where it is not self-explanatory

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts the application needs from the outside world (table storage).
pub mod ports;

// 2. Domain (Business core)
// Survey records, SOP quality rules, KPI aggregation, synthetic generator.
// Depends on NOTHING else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Technical implementations (DuckDB flat files, YAML config, HTML dashboard).
// Depends on the Domain and the Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration (Pipeline, Dashboard session, Clean).
// Depends on the Domain, the Infra and the Ports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use agrisight_core::AgrisightError;
pub use error::AgrisightError;
