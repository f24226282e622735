// agrisight-core/src/domain/quality/duplicate.rs

use std::collections::HashSet;

use crate::domain::survey::SurveyRecord;

/// First-seen-wins id tracker. Input row order decides which occurrence is canonical.
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    seen: HashSet<String>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `id` was already observed.
    pub fn observe(&mut self, id: &str) -> bool {
        !self.seen.insert(id.trim().to_string())
    }

    /// One flag per record, in input order.
    pub fn flag_all(records: &[SurveyRecord]) -> Vec<bool> {
        let mut tracker = Self::new();
        records.iter().map(|r| tracker.observe(&r.farmer_id)).collect()
    }
}

/// Drops every later occurrence of an id, keeping the first.
pub fn deduplicate(records: &[SurveyRecord]) -> Vec<SurveyRecord> {
    let mut tracker = DuplicateTracker::new();
    records
        .iter()
        .filter(|r| !tracker.observe(&r.farmer_id))
        .cloned()
        .collect()
}
