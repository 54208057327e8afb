// sapclose-core/src/domain/model/record.rs

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::fmt;

/// The join key of the reconciliation: one `ClosingCase` exists per distinct
/// pair observed in either export. Modeled as an explicit value type so the
/// merge is never positional.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    pub document_number: String,
    pub document_assignment: String,
}

impl MergeKey {
    pub fn new(document_number: impl Into<String>, document_assignment: impl Into<String>) -> Self {
        Self {
            document_number: document_number.into(),
            document_assignment: document_assignment.into(),
        }
    }
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.document_number, self.document_assignment)
    }
}

/// One open accounting line from the FBL5N export. Immutable once parsed.
///
/// Fields other than the key components are optional: the export may leave
/// them blank and a blank cell must stay distinguishable from a value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLineItem {
    pub document_number: String,
    pub document_assignment: String,
    pub clearing_document: Option<String>,
    pub dc_amount: Option<BigDecimal>,
    pub company_code: Option<String>,
    pub country: Option<String>,
    pub created_on: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub debitor: Option<String>,
    pub head_office: Option<String>,
    pub external_reference: Option<String>,
}

impl RawLineItem {
    pub fn merge_key(&self) -> MergeKey {
        MergeKey::new(
            self.document_number.clone(),
            self.document_assignment.clone(),
        )
    }
}

/// One dispute case from the DMS export. Immutable once parsed.
///
/// `document_number` / `document_assignment` are the correlation key back to
/// the accounting lines; one case may correlate to many lines.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCaseRecord {
    pub case_id: String,
    pub status_sales: Option<String>,
    pub disputed_amount: Option<BigDecimal>,
    pub short_description_of_customer: Option<String>,
    pub title: Option<String>,
    pub coordinator: Option<String>,
    pub processor: Option<String>,
    pub category: Option<String>,
    pub category_description: Option<String>,
    pub document_number: Option<String>,
    pub document_assignment: Option<String>,
}

impl RawCaseRecord {
    /// Fallback key for case records that never matched an accounting line.
    pub fn orphan_key(&self) -> MergeKey {
        MergeKey::new(
            self.document_number.clone().unwrap_or_default(),
            self.document_assignment.clone().unwrap_or_default(),
        )
    }
}
