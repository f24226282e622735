// agrisight-core/src/ports/mod.rs

pub mod store;
