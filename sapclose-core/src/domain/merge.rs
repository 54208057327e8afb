// sapclose-core/src/domain/merge.rs

use std::collections::HashMap;

use crate::domain::model::{ClosingCase, MergeKey, RawCaseRecord, RawLineItem};

/// Warning recorded when a second line item with the same merge key
/// overwrites a previously merged, different, non-null value. Last value
/// wins, but the event must stay visible on the case.
pub const DUPLICATE_LINE: &str = "DUPLICATE_LINE";

/// Warning recorded on a case that exists in DMS but has no accounting line
/// in the extraction window (the underlying item closed, or was never
/// exported).
pub const ORPHAN_CASE: &str = "ORPHAN_CASE";

#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// One case per distinct merge key, in first-seen order.
    pub cases: Vec<ClosingCase>,
    /// Number of overwrite events across all duplicate line items.
    pub duplicate_lines: usize,
    /// Number of dispute records without any accounting line.
    pub orphan_cases: usize,
}

/// Correlates the two normalized record streams into unified cases.
///
/// The dispute records are indexed by both correlation key components; the
/// document number takes precedence when both resolve. The merger performs no
/// date filtering — the extraction window is scoped upstream.
pub struct CaseMerger;

impl CaseMerger {
    pub fn merge(line_items: &[RawLineItem], case_records: &[RawCaseRecord]) -> MergeOutcome {
        let mut by_document: HashMap<&str, usize> = HashMap::new();
        let mut by_assignment: HashMap<&str, usize> = HashMap::new();
        for (idx, record) in case_records.iter().enumerate() {
            if let Some(doc) = record.document_number.as_deref()
                && !doc.is_empty()
            {
                by_document.entry(doc).or_insert(idx);
            }
            if let Some(assignment) = record.document_assignment.as_deref()
                && !assignment.is_empty()
            {
                by_assignment.entry(assignment).or_insert(idx);
            }
        }

        let mut outcome = MergeOutcome::default();
        let mut index_of: HashMap<MergeKey, usize> = HashMap::new();
        let mut matched = vec![false; case_records.len()];

        for line in line_items {
            let key = line.merge_key();

            if let Some(&case_idx) = index_of.get(&key) {
                let conflicts = merge_line_fields(&mut outcome.cases[case_idx], line);
                if conflicts > 0 {
                    outcome.cases[case_idx].warnings.record(DUPLICATE_LINE);
                    outcome.duplicate_lines += conflicts;
                }
                continue;
            }

            let mut case = ClosingCase::from_line_item(line);

            let record_idx = by_document
                .get(line.document_number.as_str())
                .or_else(|| by_assignment.get(line.document_assignment.as_str()))
                .copied();
            if let Some(record_idx) = record_idx {
                case.attach_case_record(&case_records[record_idx]);
                matched[record_idx] = true;
            }

            index_of.insert(key, outcome.cases.len());
            outcome.cases.push(case);
        }

        // Dispute cases that never met an accounting line still surface in
        // the run, carrying their own warning.
        for (idx, record) in case_records.iter().enumerate() {
            if matched[idx] {
                continue;
            }
            let key = record.orphan_key();
            if let Some(&case_idx) = index_of.get(&key) {
                // Same key as an existing case: keep key uniqueness, flag it.
                outcome.cases[case_idx].warnings.record(ORPHAN_CASE);
                outcome.orphan_cases += 1;
                continue;
            }
            let mut case = ClosingCase::from_orphan_record(record);
            case.warnings.record(ORPHAN_CASE);
            outcome.orphan_cases += 1;
            index_of.insert(key, outcome.cases.len());
            outcome.cases.push(case);
        }

        outcome
    }
}

/// Merges the fields of an additional line item into an existing case.
/// Returns the number of differing non-null overwrites.
fn merge_line_fields(case: &mut ClosingCase, line: &RawLineItem) -> usize {
    let mut conflicts = 0;

    merge_slot(&mut case.clearing_document, &line.clearing_document, &mut conflicts);
    merge_slot(&mut case.dc_amount, &line.dc_amount, &mut conflicts);
    merge_slot(&mut case.company_code, &line.company_code, &mut conflicts);
    merge_slot(&mut case.country, &line.country, &mut conflicts);
    merge_slot(&mut case.created_on, &line.created_on, &mut conflicts);
    merge_slot(&mut case.created_by, &line.created_by, &mut conflicts);
    merge_slot(&mut case.debitor, &line.debitor, &mut conflicts);
    merge_slot(&mut case.head_office, &line.head_office, &mut conflicts);
    merge_slot(&mut case.external_reference, &line.external_reference, &mut conflicts);

    conflicts
}

fn merge_slot<T: Clone + PartialEq>(slot: &mut Option<T>, incoming: &Option<T>, conflicts: &mut usize) {
    match (slot.as_ref(), incoming.as_ref()) {
        (_, None) => {}
        (None, Some(_)) => *slot = incoming.clone(),
        (Some(current), Some(new)) => {
            if current != new {
                *conflicts += 1;
                *slot = incoming.clone();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn line(doc: &str, assignment: &str) -> RawLineItem {
        RawLineItem {
            document_number: doc.to_string(),
            document_assignment: assignment.to_string(),
            clearing_document: None,
            dc_amount: Some(BigDecimal::from_str("-150.00").unwrap()),
            company_code: Some("CC01".to_string()),
            country: Some("DE".to_string()),
            created_on: None,
            created_by: None,
            debitor: Some("1000123".to_string()),
            head_office: None,
            external_reference: None,
        }
    }

    fn record(case_id: &str, doc: Option<&str>) -> RawCaseRecord {
        RawCaseRecord {
            case_id: case_id.to_string(),
            status_sales: Some("Disputed".to_string()),
            disputed_amount: Some(BigDecimal::from_str("100.00").unwrap()),
            short_description_of_customer: None,
            title: None,
            coordinator: None,
            processor: None,
            category: None,
            category_description: None,
            document_number: doc.map(str::to_string),
            document_assignment: None,
        }
    }

    #[test]
    fn test_one_case_per_distinct_merge_key() {
        let lines = vec![
            line("4100001", "A1"),
            line("4100001", "A2"),
            line("4100001", "A1"),
        ];
        let outcome = CaseMerger::merge(&lines, &[]);

        assert_eq!(outcome.cases.len(), 2);
        let keys: HashSet<_> = outcome.cases.iter().map(|c| c.key.clone()).collect();
        assert_eq!(keys.len(), outcome.cases.len());
    }

    #[test]
    fn test_duplicate_key_without_conflict_is_silent() {
        let lines = vec![line("4100001", "A1"), line("4100001", "A1")];
        let outcome = CaseMerger::merge(&lines, &[]);

        assert_eq!(outcome.cases.len(), 1);
        assert!(outcome.cases[0].warnings.is_empty());
        assert_eq!(outcome.duplicate_lines, 0);
    }

    #[test]
    fn test_conflicting_overwrite_records_duplicate_warning() {
        let mut second = line("4100001", "A1");
        second.dc_amount = Some(BigDecimal::from_str("-999.99").unwrap());

        let outcome = CaseMerger::merge(&[line("4100001", "A1"), second], &[]);

        assert_eq!(outcome.cases.len(), 1);
        let case = &outcome.cases[0];
        assert!(case.warnings.contains(DUPLICATE_LINE));
        // last value wins, the loss is visible
        assert_eq!(
            case.dc_amount,
            Some(BigDecimal::from_str("-999.99").unwrap())
        );
        assert_eq!(outcome.duplicate_lines, 1);
    }

    #[test]
    fn test_case_record_joined_by_document_number() {
        let outcome = CaseMerger::merge(
            &[line("4100001", "A1")],
            &[record("900042", Some("4100001"))],
        );

        let case = &outcome.cases[0];
        assert_eq!(case.case_id.as_deref(), Some("900042"));
        assert_eq!(case.status_sales.as_deref(), Some("Disputed"));
        assert_eq!(outcome.orphan_cases, 0);
    }

    #[test]
    fn test_unmatched_record_becomes_orphan_case() {
        let outcome = CaseMerger::merge(
            &[line("4100001", "A1")],
            &[record("900042", Some("4100001")), record("900043", Some("4200000"))],
        );

        assert_eq!(outcome.cases.len(), 2);
        assert_eq!(outcome.orphan_cases, 1);
        let orphan = outcome
            .cases
            .iter()
            .find(|c| c.case_id.as_deref() == Some("900043"))
            .unwrap();
        assert!(orphan.warnings.contains(ORPHAN_CASE));
        assert!(orphan.dc_amount.is_none());
    }

    #[test]
    fn test_unmatched_line_keeps_null_case_fields() {
        let outcome = CaseMerger::merge(&[line("4100001", "A1")], &[]);

        let case = &outcome.cases[0];
        assert!(!case.has_case_data());
        assert!(case.status_sales.is_none());
        assert!(case.disputed_amount.is_none());
    }
}
