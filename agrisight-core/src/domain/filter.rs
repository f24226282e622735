// agrisight-core/src/domain/filter.rs
//
// Dashboard selection: which rows a recomputation looks at.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::quality::AssessedRecord;
use crate::domain::survey::SurveyRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuredStatus {
    #[default]
    All,
    Yes,
    No,
}

impl InsuredStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    fn admits(&self, insured: bool) -> bool {
        match self {
            Self::All => true,
            Self::Yes => insured,
            Self::No => !insured,
        }
    }
}

impl fmt::Display for InsuredStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InsuredStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(format!("Unknown insurance status: {} (expected all|yes|no)", s)),
        }
    }
}

/// Inclusive on both ends; an open end is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        if self.is_open() {
            return true;
        }
        match date {
            None => false,
            Some(d) => self.start.is_none_or(|s| d >= s) && self.end.is_none_or(|e| d <= e),
        }
    }
}

/// Empty sets mean "no constraint" on that attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyFilter {
    #[serde(default)]
    pub countries: BTreeSet<String>,
    #[serde(default)]
    pub regions: BTreeSet<String>,
    #[serde(default)]
    pub crops: BTreeSet<String>,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub insured: InsuredStatus,
}

fn admits(set: &BTreeSet<String>, value: Option<&str>) -> bool {
    if set.is_empty() {
        return true;
    }
    value.is_some_and(|v| set.iter().any(|s| s.trim().eq_ignore_ascii_case(v.trim())))
}

impl SurveyFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.countries.is_empty()
            && self.regions.is_empty()
            && self.crops.is_empty()
            && self.date_range.is_open()
            && self.insured == InsuredStatus::All
    }

    pub fn matches(&self, record: &SurveyRecord) -> bool {
        admits(&self.countries, record.country.as_deref())
            && admits(&self.regions, record.region.as_deref())
            && admits(&self.crops, record.crop.as_deref())
            && self.date_range.admits(record.survey_date)
            && self.insured.admits(record.insured)
    }

    pub fn apply<'a>(&self, rows: &'a [AssessedRecord]) -> Vec<&'a AssessedRecord> {
        rows.iter().filter(|r| self.matches(&r.record)).collect()
    }

    /// One-line human summary for report headers.
    pub fn describe(&self) -> String {
        if self.is_unconstrained() {
            return "all records".to_string();
        }
        let mut parts = Vec::new();
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(", ");
        if !self.countries.is_empty() {
            parts.push(format!("country: {}", join(&self.countries)));
        }
        if !self.regions.is_empty() {
            parts.push(format!("region: {}", join(&self.regions)));
        }
        if !self.crops.is_empty() {
            parts.push(format!("crop: {}", join(&self.crops)));
        }
        if !self.date_range.is_open() {
            let show = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "…".into());
            parts.push(format!(
                "dates: {} to {}",
                show(self.date_range.start),
                show(self.date_range.end)
            ));
        }
        if self.insured != InsuredStatus::All {
            parts.push(format!("insured: {}", self.insured));
        }
        parts.join(" | ")
    }
}

/// Cascading choices: regions follow the selected countries, crops follow
/// countries + regions, the date bounds follow all three.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub regions: Vec<String>,
    pub crops: Vec<String>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn cascade<'a, I>(records: I, filter: &SurveyFilter) -> Self
    where
        I: IntoIterator<Item = &'a SurveyRecord>,
    {
        let records: Vec<&SurveyRecord> = records.into_iter().collect();
        let distinct = |it: &mut dyn Iterator<Item = Option<&'a String>>| -> Vec<String> {
            it.flatten()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        let countries = distinct(&mut records.iter().map(|r| r.country.as_ref()));

        let in_countries: Vec<&SurveyRecord> = records
            .iter()
            .copied()
            .filter(|r| admits(&filter.countries, r.country.as_deref()))
            .collect();
        let regions = distinct(&mut in_countries.iter().map(|r| r.region.as_ref()));

        let in_regions: Vec<&SurveyRecord> = in_countries
            .into_iter()
            .filter(|r| admits(&filter.regions, r.region.as_deref()))
            .collect();
        let crops = distinct(&mut in_regions.iter().map(|r| r.crop.as_ref()));

        let dates: Vec<NaiveDate> = in_regions
            .iter()
            .filter(|r| admits(&filter.crops, r.crop.as_deref()))
            .filter_map(|r| r.survey_date)
            .collect();

        Self {
            countries,
            regions,
            crops,
            min_date: dates.iter().min().copied(),
            max_date: dates.iter().max().copied(),
        }
    }
}
