//! Record normalization helpers shared by the evidence agents:
//! identity-key deduplication, trial status classification, and best-effort
//! coercion of free-text registry fields.

use crate::models::{EvidenceRecord, PatentRecord, TrialRecord};

/// Statuses counted as a successful trial outcome.
const SUCCESS_STATUS_TOKENS: &[&str] = &["completed", "approved", "active", "enrolling by invitation"];
/// Statuses counted as a failed trial outcome.
const FAILURE_STATUS_TOKENS: &[&str] = &["terminated", "suspended", "withdrawn"];

/// A record with a deduplication identity: the registry identifier when
/// present, otherwise the display name. Records with neither are discarded.
pub trait Keyed {
    fn identity_key(&self) -> Option<&str>;
}

impl Keyed for TrialRecord {
    fn identity_key(&self) -> Option<&str> {
        self.nct_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| (!self.trial_name.is_empty()).then_some(self.trial_name.as_str()))
    }
}

impl Keyed for PatentRecord {
    fn identity_key(&self) -> Option<&str> {
        self.number
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.title.as_deref().filter(|t| !t.is_empty()))
    }
}

impl Keyed for EvidenceRecord {
    fn identity_key(&self) -> Option<&str> {
        (!self.title.is_empty()).then_some(self.title.as_str())
    }
}

/// Drop keyless records and later duplicates; first occurrence wins and
/// relative order is preserved. Idempotent.
pub fn dedupe_records<R: Keyed>(records: Vec<R>) -> Vec<R> {
    let mut seen: Vec<String> = Vec::new();
    let mut result = Vec::new();
    for record in records {
        let Some(key) = record.identity_key() else {
            continue;
        };
        if seen.iter().any(|existing| existing == key) {
            continue;
        }
        seen.push(key.to_string());
        result.push(record);
    }
    result
}

/// Exhaustive, disjoint partition of trials into successful / failed /
/// inconclusive by case-insensitive substring match on the status field.
/// Input order is preserved within each partition.
pub fn segment_trials(
    records: &[TrialRecord],
) -> (Vec<TrialRecord>, Vec<TrialRecord>, Vec<TrialRecord>) {
    let mut successful = Vec::new();
    let mut failed = Vec::new();
    let mut inconclusive = Vec::new();

    for record in records {
        let status = record.status.to_lowercase();
        if SUCCESS_STATUS_TOKENS.iter().any(|t| status.contains(t)) {
            successful.push(record.clone());
        } else if FAILURE_STATUS_TOKENS.iter().any(|t| status.contains(t)) {
            failed.push(record.clone());
        } else {
            inconclusive.push(record.clone());
        }
    }

    (successful, failed, inconclusive)
}

/// Best-effort enrollment parse; anything non-numeric becomes `None`.
pub fn parse_enrollment(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// Pull a 4-digit year out of a free-text date ("March 2015", "2015-03-01").
/// Extraction failure yields `None`, never an error.
pub fn extract_year(raw: Option<&str>) -> Option<i32> {
    let text = raw?;
    for token in text.split_whitespace() {
        if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
            return token.parse().ok();
        }
    }
    let prefix: String = text.chars().take(4).collect();
    if prefix.len() == 4 && prefix.chars().all(|c| c.is_ascii_digit()) {
        return prefix.parse().ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(nct_id: Option<&str>, name: &str, status: &str) -> TrialRecord {
        TrialRecord {
            nct_id: nct_id.map(str::to_string),
            trial_name: name.to_string(),
            phase: "Phase II".to_string(),
            status: status.to_string(),
            disease: "Obesity".to_string(),
            region: None,
            year: None,
            enrollment: None,
            sponsor: None,
            evidence_note: "note".to_string(),
            url: None,
        }
    }

    #[test]
    fn test_dedupe_prefers_registry_id_first_wins() {
        let records = vec![
            trial(Some("NCT01"), "First", "Completed"),
            trial(Some("NCT01"), "Duplicate of first", "Terminated"),
            trial(None, "Named only", "Unknown"),
            trial(None, "Named only", "Unknown"),
            trial(None, "", "Unknown"),
        ];
        let deduped = dedupe_records(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].trial_name, "First");
        assert_eq!(deduped[1].trial_name, "Named only");
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let records = vec![
            trial(Some("NCT01"), "First", "Completed"),
            trial(Some("NCT02"), "Second", "Ongoing"),
        ];
        let once = dedupe_records(records);
        let keys: Vec<_> = once.iter().map(|r| r.trial_name.clone()).collect();
        let twice = dedupe_records(once);
        let keys_again: Vec<_> = twice.iter().map(|r| r.trial_name.clone()).collect();
        assert_eq!(keys, keys_again);
    }

    #[test]
    fn test_segmentation_is_exhaustive_and_disjoint() {
        let records = vec![
            trial(Some("a"), "A", "Completed"),
            trial(Some("b"), "B", "Recruiting"),
            trial(Some("c"), "C", "Terminated"),
            trial(Some("d"), "D", "Enrolling by invitation"),
            trial(Some("e"), "E", "Suspended"),
            trial(Some("f"), "F", "Unknown status"),
        ];
        let (successful, failed, inconclusive) = segment_trials(&records);
        assert_eq!(successful.len() + failed.len() + inconclusive.len(), records.len());
        assert_eq!(successful.len(), 2); // Completed + Enrolling by invitation
        assert_eq!(failed.len(), 2); // Terminated + Suspended
        assert_eq!(inconclusive.len(), 2);
    }

    #[test]
    fn test_segmentation_is_case_insensitive_and_order_preserving() {
        let records = vec![
            trial(Some("a"), "A", "COMPLETED"),
            trial(Some("b"), "B", "Active, not recruiting"),
        ];
        let (successful, _, _) = segment_trials(&records);
        assert_eq!(successful.len(), 2);
        assert_eq!(successful[0].trial_name, "A");
        assert_eq!(successful[1].trial_name, "B");
    }

    #[test]
    fn test_parse_enrollment_failure_is_none() {
        assert_eq!(parse_enrollment(Some("150")), Some(150));
        assert_eq!(parse_enrollment(Some(" 150 ")), Some(150));
        assert_eq!(parse_enrollment(Some("about 150")), None);
        assert_eq!(parse_enrollment(None), None);
    }

    #[test]
    fn test_extract_year_from_free_text() {
        assert_eq!(extract_year(Some("March 2015")), Some(2015));
        assert_eq!(extract_year(Some("2015-03-01")), Some(2015));
        assert_eq!(extract_year(Some("spring of 99")), None);
        assert_eq!(extract_year(None), None);
    }
}
