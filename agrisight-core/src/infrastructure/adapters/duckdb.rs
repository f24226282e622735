// agrisight-core/src/infrastructure/adapters/duckdb.rs

use duckdb::{Config, Connection, params_from_iter};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::domain::survey::schema::{self, SURVEY_COLUMNS};
use crate::domain::survey::FlatTable;
use crate::error::AgrisightError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write_with;
use crate::ports::store::{LoadedSurvey, TableStore};

const SCAN_TABLE: &str = "agrisight_scan";
const EXPORT_TABLE: &str = "agrisight_export";
const REJECTS_TABLE: &str = "agrisight_rejects";
const REJECT_SCANS_TABLE: &str = "agrisight_reject_scans";

/// Flat-file store backed by an embedded DuckDB.
///
/// Files are read with `read_csv` (every column as text) and written with
/// `COPY ... TO`; typing stays on the Rust side. Lines the CSV reader cannot
/// split (wrong cell count, broken quoting) land in DuckDB's reject log and
/// are counted rather than failing the load.
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();
        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, InfrastructureError> {
        Self::new(":memory:")
    }

    fn columns(&self, table: &str) -> Result<Vec<String>, InfrastructureError> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info('{}')", table))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>("name"))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn select_cells(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<Vec<Vec<Option<String>>>, InfrastructureError> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }
        let projection = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM {}", projection, table))?;
        let width = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Option<String>>(i))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Loads the file into the scan table; returns how many lines the reader rejected.
    fn scan(&self, path: &Path) -> Result<usize, InfrastructureError> {
        if !path.is_file() {
            return Err(InfrastructureError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input file not found: {}", path.display()),
            )));
        }
        // The reject log only ever describes the latest scan.
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; DROP TABLE IF EXISTS {};",
            REJECTS_TABLE, REJECT_SCANS_TABLE
        ))?;
        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv('{}', header = true, all_varchar = true, store_rejects = true, rejects_table = '{}', rejects_scan = '{}')",
            SCAN_TABLE,
            sql_path(path),
            REJECTS_TABLE,
            REJECT_SCANS_TABLE
        );
        debug!(%sql, "Scanning flat file");
        self.conn.execute_batch(&sql)?;

        let logged: i64 = self.conn.query_row(
            "SELECT count(*) FROM duckdb_tables() WHERE table_name = ?",
            [REJECTS_TABLE],
            |row| row.get(0),
        )?;
        if logged == 0 {
            return Ok(0);
        }
        let rejected: i64 = self.conn.query_row(
            &format!("SELECT count(DISTINCT line) FROM {}", REJECTS_TABLE),
            [],
            |row| row.get(0),
        )?;
        let rejected = usize::try_from(rejected).unwrap_or_default();
        if rejected > 0 {
            warn!(path = %path.display(), rejected, "CSV reader rejected lines");
        }
        Ok(rejected)
    }

    fn copy_out(&self, path: &Path, table: &FlatTable) -> Result<usize, InfrastructureError> {
        let definition = table
            .columns
            .iter()
            .map(|c| format!("{} VARCHAR", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TEMP TABLE {} ({})",
            EXPORT_TABLE, definition
        ))?;

        {
            let placeholders = vec!["?"; table.columns.len()].join(", ");
            let mut insert = self.conn.prepare(&format!(
                "INSERT INTO {} VALUES ({})",
                EXPORT_TABLE, placeholders
            ))?;
            for row in &table.rows {
                insert.execute(params_from_iter(row.iter()))?;
            }
        }

        let written = atomic_write_with(path, |staging| {
            self.conn.execute_batch(&format!(
                "COPY {} TO '{}' (HEADER, DELIMITER ',')",
                EXPORT_TABLE,
                sql_path(staging)
            ))?;
            Ok(table.len())
        })?;
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", EXPORT_TABLE))?;

        Ok(written)
    }
}

impl TableStore for DuckDbStore {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn load_survey(&self, path: &Path) -> Result<LoadedSurvey, AgrisightError> {
        let rejected_lines = self.scan(path)?;
        let header = self.columns(SCAN_TABLE)?;
        schema::check_header(&header)?;

        // Schema order, whatever the file order; extra columns are dropped here.
        let projection: Vec<String> = SURVEY_COLUMNS
            .iter()
            .filter_map(|col| {
                header
                    .iter()
                    .find(|h| h.trim().eq_ignore_ascii_case(col))
                    .cloned()
            })
            .collect();

        let cells = self.select_cells(SCAN_TABLE, &projection)?;
        let parsed = schema::parse_rows(&cells);

        info!(
            rows = cells.len(),
            records = parsed.records.len(),
            malformed = parsed.malformed_count(),
            rejected_lines,
            "Survey file loaded"
        );
        Ok(LoadedSurvey {
            records: parsed.records,
            malformed: parsed.malformed,
            rejected_lines,
        })
    }

    #[instrument(skip(self, table), fields(path = %path.display(), rows = table.len()))]
    fn export_table(&self, path: &Path, table: &FlatTable) -> Result<usize, AgrisightError> {
        if table.columns.is_empty() {
            return Err(AgrisightError::InternalError(
                "cannot export a table without columns".into(),
            ));
        }
        if let Some(bad) = table.rows.iter().find(|r| r.len() != table.columns.len()) {
            return Err(AgrisightError::InternalError(format!(
                "row width {} does not match {} columns",
                bad.len(),
                table.columns.len()
            )));
        }

        let written = self.copy_out(path, table)?;
        info!(rows = written, "Table exported");
        Ok(written)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_path(path: &Path) -> String {
    path.display().to_string().replace('\'', "''")
}
