// agrisight-core/src/domain/survey/schema.rs
//
// Flat-file shape of a SurveyRecord: one text cell per column, in a fixed order.
// The store adapters only ever move `FlatTable`s; typing happens here.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::domain::error::DomainError;
use crate::domain::survey::record::SurveyRecord;

pub const SURVEY_COLUMNS: [&str; 14] = [
    "farmer_id",
    "agent_id",
    "country",
    "region",
    "crop",
    "latitude",
    "longitude",
    "survey_date",
    "insured",
    "claim_triggered",
    "payout_amount_usd",
    "farm_size_ha",
    "yield_kg_per_ha",
    "household_size",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Untyped table exchanged with flat files. `None` is an empty cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl FlatTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of typing a raw table: the good rows plus one error per skipped row.
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub records: Vec<SurveyRecord>,
    pub malformed: Vec<DomainError>,
}

impl ParsedRows {
    pub fn malformed_count(&self) -> usize {
        self.malformed.len()
    }
}

/// Required schema columns absent from a file header (case-insensitive).
pub fn missing_columns(header: &[String]) -> Vec<&'static str> {
    SURVEY_COLUMNS
        .iter()
        .filter(|col| !header.iter().any(|h| h.trim().eq_ignore_ascii_case(col)))
        .copied()
        .collect()
}

pub fn check_header(header: &[String]) -> Result<(), DomainError> {
    let missing = missing_columns(header);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::SchemaError(format!(
            "missing column(s): {}",
            missing.join(", ")
        )))
    }
}

// --- ENCODING ---

pub fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

pub fn record_cells(record: &SurveyRecord) -> Vec<Option<String>> {
    vec![
        Some(record.farmer_id.clone()),
        record.agent_id.clone(),
        record.country.clone(),
        record.region.clone(),
        record.crop.clone(),
        record.latitude.map(|v| v.to_string()),
        record.longitude.map(|v| v.to_string()),
        record.survey_date.map(|d| d.format(DATE_FORMAT).to_string()),
        Some(yes_no(record.insured).to_string()),
        Some(yes_no(record.claim_triggered).to_string()),
        record.payout_amount_usd.map(|v| v.to_string()),
        record.farm_size_ha.map(|v| v.to_string()),
        record.yield_kg_per_ha.map(|v| v.to_string()),
        record.household_size.map(|v| v.to_string()),
    ]
}

pub fn records_to_table(records: &[SurveyRecord]) -> FlatTable {
    let mut table = FlatTable::new(&SURVEY_COLUMNS);
    for record in records {
        table.push(record_cells(record));
    }
    table
}

// --- DECODING ---

/// Types rows given in `SURVEY_COLUMNS` order. Rows that do not fit the schema
/// are skipped and reported, never fatal.
pub fn parse_rows(rows: &[Vec<Option<String>>]) -> ParsedRows {
    let mut parsed = ParsedRows::default();
    for (idx, row) in rows.iter().enumerate() {
        // 1-based data row, header excluded
        let row_no = idx + 1;
        match parse_row(row) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                warn!(row = row_no, %reason, "Skipping malformed survey row");
                parsed.malformed.push(DomainError::MalformedInput {
                    row: row_no,
                    reason,
                });
            }
        }
    }
    parsed
}

fn parse_row(row: &[Option<String>]) -> Result<SurveyRecord, String> {
    if row.len() != SURVEY_COLUMNS.len() {
        return Err(format!(
            "expected {} cells, found {}",
            SURVEY_COLUMNS.len(),
            row.len()
        ));
    }
    let cell = |i: usize| -> Option<&str> {
        row[i].as_deref().map(str::trim).filter(|s| !s.is_empty())
    };

    let farmer_id = cell(0).ok_or("farmer_id is empty")?.to_string();

    Ok(SurveyRecord {
        farmer_id,
        agent_id: cell(1).map(str::to_string),
        country: cell(2).map(str::to_string),
        region: cell(3).map(str::to_string),
        crop: cell(4).map(str::to_string),
        latitude: cell(5).map(|v| parse_decimal("latitude", v)).transpose()?,
        longitude: cell(6).map(|v| parse_decimal("longitude", v)).transpose()?,
        survey_date: cell(7).map(parse_date).transpose()?,
        insured: parse_flag("insured", cell(8))?,
        claim_triggered: parse_flag("claim_triggered", cell(9))?,
        payout_amount_usd: cell(10)
            .map(|v| parse_decimal("payout_amount_usd", v))
            .transpose()?,
        farm_size_ha: cell(11)
            .map(|v| parse_decimal("farm_size_ha", v))
            .transpose()?,
        yield_kg_per_ha: cell(12)
            .map(|v| parse_decimal("yield_kg_per_ha", v))
            .transpose()?,
        household_size: cell(13).map(parse_count).transpose()?,
    })
}

fn parse_decimal(column: &str, raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("{} is not a number: '{}'", column, raw)),
    }
}

/// Accepts "4" as well as the "4.0" that spreadsheet tools emit for integer columns.
fn parse_count(raw: &str) -> Result<u32, String> {
    if let Ok(v) = raw.parse::<u32>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        _ => Err(format!("household_size is not a count: '{}'", raw)),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .map_err(|_| format!("survey_date is not a date: '{}'", raw))
}

pub fn parse_yes_no(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_flag(column: &str, raw: Option<&str>) -> Result<bool, String> {
    let raw = raw.ok_or_else(|| format!("{} is empty", column))?;
    parse_yes_no(raw).ok_or_else(|| format!("{} is not Yes/No: '{}'", column, raw))
}
