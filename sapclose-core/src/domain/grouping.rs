// sapclose-core/src/domain/grouping.rs

use std::collections::HashMap;

use crate::domain::model::{ClosingCase, Recipient};

/// Bucket label for cases missing a country or company code. Such cases are
/// reported, never dropped.
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub country: String,
    pub company_code: String,
}

impl GroupKey {
    pub fn for_case(case: &ClosingCase) -> Self {
        match (case.country.as_deref(), case.company_code.as_deref()) {
            (Some(country), Some(company_code)) => Self {
                country: country.to_string(),
                company_code: company_code.to_string(),
            },
            _ => Self {
                country: UNASSIGNED.to_string(),
                company_code: UNASSIGNED.to_string(),
            },
        }
    }
}

/// One per-(country, company_code) reporting partition. Holds indexes into
/// the classified case set — the cases themselves are frozen at this point
/// and never re-evaluated or mutated here.
#[derive(Debug, Clone)]
pub struct ReportGroup {
    pub key: GroupKey,
    pub case_indexes: Vec<usize>,
}

/// Partitions the classified cases for reporting. Group order and row order
/// within a group both follow merger insertion order.
pub fn partition_reports(cases: &[ClosingCase]) -> Vec<ReportGroup> {
    let mut groups: Vec<ReportGroup> = Vec::new();
    let mut index_of: HashMap<GroupKey, usize> = HashMap::new();

    for (case_idx, case) in cases.iter().enumerate() {
        let key = GroupKey::for_case(case);
        match index_of.get(&key) {
            Some(&group_idx) => groups[group_idx].case_indexes.push(case_idx),
            None => {
                index_of.insert(key.clone(), groups.len());
                groups.push(ReportGroup {
                    key,
                    case_indexes: vec![case_idx],
                });
            }
        }
    }

    groups
}

/// The notification-side partition: the subset of case indexes a recipient
/// is interested in. A pure projection of the same classified set.
pub fn partition_for_recipient(cases: &[ClosingCase], recipient: &Recipient) -> Vec<usize> {
    cases
        .iter()
        .enumerate()
        .filter(|(_, case)| recipient.country.covers(case.country.as_deref()))
        .map(|(idx, _)| idx)
        .collect()
}
