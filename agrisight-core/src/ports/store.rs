// agrisight-core/src/ports/store.rs

// What the pipeline needs from a flat-file backend, without knowing which
// engine reads and writes the files.

use std::path::Path;

use crate::domain::error::DomainError;
use crate::domain::survey::{FlatTable, SurveyRecord};
use crate::error::AgrisightError;

/// Typed result of reading a raw survey file.
#[derive(Debug, Default)]
pub struct LoadedSurvey {
    pub records: Vec<SurveyRecord>,
    /// Rows that parsed as CSV but did not fit the record schema.
    pub malformed: Vec<DomainError>,
    /// Lines the CSV reader itself could not split into cells.
    pub rejected_lines: usize,
}

impl LoadedSurvey {
    pub fn malformed_count(&self) -> usize {
        self.malformed.len() + self.rejected_lines
    }
}

pub trait TableStore {
    /// Reads a survey CSV. Missing schema columns are a `SchemaError`;
    /// bad rows are skipped and counted.
    fn load_survey(&self, path: &Path) -> Result<LoadedSurvey, AgrisightError>;

    /// Writes a table with a header line; returns the number of data rows.
    fn export_table(&self, path: &Path, table: &FlatTable) -> Result<usize, AgrisightError>;

    fn engine_name(&self) -> &str;
}
