pub mod duckdb;

pub use self::duckdb::DuckDbStore;
