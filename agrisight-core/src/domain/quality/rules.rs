// agrisight-core/src/domain/quality/rules.rs
//
// Row-local SOP rules. Each returns true when the record FAILS the rule.

use crate::domain::survey::{GeoBounds, SurveyRecord};

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Null / required-field check.
pub fn has_missing_value(record: &SurveyRecord) -> bool {
    record.farmer_id.trim().is_empty()
        || blank(&record.agent_id)
        || blank(&record.country)
        || blank(&record.region)
        || blank(&record.crop)
        || record.latitude.is_none()
        || record.longitude.is_none()
        || record.survey_date.is_none()
        || record.farm_size_ha.is_none()
        || record.yield_kg_per_ha.is_none()
        || record.household_size.is_none()
}

/// GPS bounds check. Absent coordinates are the missing-value rule's concern.
pub fn has_invalid_gps(record: &SurveyRecord, study_area: Option<&GeoBounds>) -> bool {
    let outside = |bounds: &GeoBounds| {
        record.latitude.is_some_and(|lat| !bounds.contains_lat(lat))
            || record.longitude.is_some_and(|lon| !bounds.contains_lon(lon))
    };
    outside(&GeoBounds::GLOBAL) || study_area.is_some_and(outside)
}

/// Logical consistency: a claim implies insurance and a positive payout,
/// and only claims carry a payout.
pub fn has_inconsistent_claim(record: &SurveyRecord) -> bool {
    let payout = record.payout();
    if payout < 0.0 {
        return true;
    }
    if record.claim_triggered {
        !record.insured || payout <= 0.0
    } else {
        payout > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::record::fixtures::*;

    #[test]
    fn test_complete_record_passes_every_rule() {
        let r = claimed("F-1", 120.0);
        assert!(!has_missing_value(&r));
        assert!(!has_invalid_gps(&r, None));
        assert!(!has_inconsistent_claim(&r));
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let mut r = record("F-1");
        r.crop = Some("  ".into());
        assert!(has_missing_value(&r));

        let mut r = record("F-2");
        r.household_size = None;
        assert!(has_missing_value(&r));
    }

    #[test]
    fn test_gps_outside_valid_range() {
        let mut r = record("F-1");
        r.latitude = Some(95.2);
        assert!(has_invalid_gps(&r, None));

        let mut r = record("F-2");
        r.longitude = Some(-181.0);
        assert!(has_invalid_gps(&r, None));

        let mut r = record("F-3");
        r.latitude = None;
        assert!(!has_invalid_gps(&r, None), "absent is not invalid");
    }

    #[test]
    fn test_gps_outside_study_area() {
        let mut r = record("F-1");
        r.latitude = Some(48.85);
        r.longitude = Some(2.35);
        let area = GeoBounds::new(-20.0, 15.0, 20.0, 45.0);
        assert!(!has_invalid_gps(&r, None));
        assert!(has_invalid_gps(&r, Some(&area)));
    }

    #[test]
    fn test_claim_without_insurance_is_inconsistent() {
        let mut r = claimed("F-1", 250.0);
        r.insured = false;
        assert!(has_inconsistent_claim(&r));
    }

    #[test]
    fn test_claim_payout_mismatches() {
        assert!(has_inconsistent_claim(&claimed("F-1", 0.0)));

        let mut paid_without_claim = insured("F-2");
        paid_without_claim.payout_amount_usd = Some(80.0);
        assert!(has_inconsistent_claim(&paid_without_claim));

        let mut negative = record("F-3");
        negative.payout_amount_usd = Some(-5.0);
        assert!(has_inconsistent_claim(&negative));

        let mut no_amount = insured("F-4");
        no_amount.payout_amount_usd = None;
        assert!(!has_inconsistent_claim(&no_amount));
    }
}
