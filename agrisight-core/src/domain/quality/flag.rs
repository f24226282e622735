// agrisight-core/src/domain/quality/flag.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// Declaration order is the SOP rule order; BTreeSet iteration follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssue {
    MissingValue,
    InvalidGps,
    Duplicate,
    Outlier,
    InconsistentClaim,
}

impl QualityIssue {
    pub const ALL: [QualityIssue; 5] = [
        Self::MissingValue,
        Self::InvalidGps,
        Self::Duplicate,
        Self::Outlier,
        Self::InconsistentClaim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingValue => "missing_value",
            Self::InvalidGps => "invalid_gps",
            Self::Duplicate => "duplicate",
            Self::Outlier => "outlier",
            Self::InconsistentClaim => "inconsistent_claim",
        }
    }
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QualityIssue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityIssue::ALL
            .into_iter()
            .find(|issue| issue.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown quality issue: {}", s))
    }
}

/// Set of failed rules for one record. Empty means clean.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityFlags(BTreeSet<QualityIssue>);

impl QualityFlags {
    pub fn insert(&mut self, issue: QualityIssue) {
        self.0.insert(issue);
    }

    pub fn contains(&self, issue: QualityIssue) -> bool {
        self.0.contains(&issue)
    }

    pub fn is_clean(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = QualityIssue> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<QualityIssue> for QualityFlags {
    fn from_iter<I: IntoIterator<Item = QualityIssue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// `;`-joined, rule order. This is the flat-file encoding.
impl fmt::Display for QualityFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(QualityIssue::as_str).collect();
        write!(f, "{}", names.join(";"))
    }
}
