// sapclose-core/src/domain/model/case.rs

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{MergeKey, RawCaseRecord, RawLineItem};

/// Canonical case status. The raw `Status_Sales` text from DMS is mapped to
/// one of these through the configuration-owned status map; cases without any
/// dispute data default to `Unresolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unresolved,
    Open,
    Solved,
    Closed,
    Devaluated,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unresolved => "Unresolved",
            Self::Open => "Open",
            Self::Solved => "Solved",
            Self::Closed => "Closed",
            Self::Devaluated => "Devaluated",
        }
    }

    pub const ALL: [Status; 5] = [
        Status::Unresolved,
        Status::Open,
        Status::Solved,
        Status::Closed,
        Status::Devaluated,
    ];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered, duplicate-free list of warning codes. Insertion order is part of
/// the audit trail, so a plain `HashSet` is not enough.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningSet(Vec<String>);

impl WarningSet {
    pub fn record(&mut self, code: impl Into<String>) {
        let code = code.into();
        if !self.0.iter().any(|c| *c == code) {
            self.0.push(code);
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for WarningSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

/// Every field name a rule condition may reference. Checked at rule load
/// time: a condition naming anything else is rejected before the first case
/// is evaluated.
pub const KNOWN_FIELDS: &[&str] = &[
    // accounting side
    "Document_Number",
    "Document_Assignment",
    "Clearing_Document",
    "DC_Amount",
    "Company_Code",
    "Country",
    "Created_On",
    "Created_By",
    "Debitor",
    "Head_Office",
    "External_Reference",
    // dispute side
    "Case_ID",
    "Status_Sales",
    "Disputed_Amount",
    "Short_Description_of_Customer",
    "Title",
    "Coordinator",
    "Processor",
    "Category",
    "Category_Description",
    // engine-assigned (rules may chain on these)
    "Status",
    "Root_Cause",
    "Message",
];

/// Typed view of one case field, used by rule conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Amount(&'a BigDecimal),
    Date(NaiveDate),
    Null,
}

/// The unit of reconciliation: one accounting line set merged with at most
/// one dispute case, plus the classification assigned by the rule engine.
///
/// Dispute-side fields stay `None` when no DMS record matched — never
/// defaulted to zero or empty, so "no dispute case" and "dispute case with an
/// empty field" remain distinguishable downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingCase {
    pub key: MergeKey,

    // accounting side (merged, last write wins)
    pub clearing_document: Option<String>,
    pub dc_amount: Option<BigDecimal>,
    pub company_code: Option<String>,
    pub country: Option<String>,
    pub created_on: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub debitor: Option<String>,
    pub head_office: Option<String>,
    pub external_reference: Option<String>,

    // dispute side (absent when no case matched)
    pub case_id: Option<String>,
    pub status_sales: Option<String>,
    pub disputed_amount: Option<BigDecimal>,
    pub short_description_of_customer: Option<String>,
    pub title: Option<String>,
    pub coordinator: Option<String>,
    pub processor: Option<String>,
    pub category: Option<String>,
    pub category_description: Option<String>,

    // engine-assigned
    pub warnings: WarningSet,
    pub message: String,
    pub root_cause: Option<String>,
    pub status: Option<Status>,
}

impl ClosingCase {
    /// Creates a case from its first accounting line.
    pub fn from_line_item(line: &RawLineItem) -> Self {
        Self {
            key: line.merge_key(),
            clearing_document: line.clearing_document.clone(),
            dc_amount: line.dc_amount.clone(),
            company_code: line.company_code.clone(),
            country: line.country.clone(),
            created_on: line.created_on,
            created_by: line.created_by.clone(),
            debitor: line.debitor.clone(),
            head_office: line.head_office.clone(),
            external_reference: line.external_reference.clone(),
            case_id: None,
            status_sales: None,
            disputed_amount: None,
            short_description_of_customer: None,
            title: None,
            coordinator: None,
            processor: None,
            category: None,
            category_description: None,
            warnings: WarningSet::default(),
            message: String::new(),
            root_cause: None,
            status: None,
        }
    }

    /// Creates a case for a dispute record that matched no accounting line.
    pub fn from_orphan_record(record: &RawCaseRecord) -> Self {
        let mut case = Self {
            key: record.orphan_key(),
            clearing_document: None,
            dc_amount: None,
            company_code: None,
            country: None,
            created_on: None,
            created_by: None,
            debitor: None,
            head_office: None,
            external_reference: None,
            case_id: None,
            status_sales: None,
            disputed_amount: None,
            short_description_of_customer: None,
            title: None,
            coordinator: None,
            processor: None,
            category: None,
            category_description: None,
            warnings: WarningSet::default(),
            message: String::new(),
            root_cause: None,
            status: None,
        };
        case.attach_case_record(record);
        case
    }

    /// Copies the dispute-side fields of a matched DMS record into the case.
    pub fn attach_case_record(&mut self, record: &RawCaseRecord) {
        self.case_id = Some(record.case_id.clone());
        self.status_sales = record.status_sales.clone();
        self.disputed_amount = record.disputed_amount.clone();
        self.short_description_of_customer = record.short_description_of_customer.clone();
        self.title = record.title.clone();
        self.coordinator = record.coordinator.clone();
        self.processor = record.processor.clone();
        self.category = record.category.clone();
        self.category_description = record.category_description.clone();
    }

    pub fn has_case_data(&self) -> bool {
        self.case_id.is_some()
    }

    /// Looks up a field by its configured name. Returns `None` for a name
    /// outside [`KNOWN_FIELDS`]; a blank or absent value is `FieldValue::Null`.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        fn text(opt: &Option<String>) -> FieldValue<'_> {
            match opt.as_deref() {
                Some(s) => FieldValue::Text(s),
                None => FieldValue::Null,
            }
        }
        fn amount(opt: &Option<BigDecimal>) -> FieldValue<'_> {
            match opt.as_ref() {
                Some(a) => FieldValue::Amount(a),
                None => FieldValue::Null,
            }
        }

        let value = match name {
            "Document_Number" => FieldValue::Text(&self.key.document_number),
            "Document_Assignment" => FieldValue::Text(&self.key.document_assignment),
            "Clearing_Document" => text(&self.clearing_document),
            "DC_Amount" => amount(&self.dc_amount),
            "Company_Code" => text(&self.company_code),
            "Country" => text(&self.country),
            "Created_On" => match self.created_on {
                Some(d) => FieldValue::Date(d),
                None => FieldValue::Null,
            },
            "Created_By" => text(&self.created_by),
            "Debitor" => text(&self.debitor),
            "Head_Office" => text(&self.head_office),
            "External_Reference" => text(&self.external_reference),
            "Case_ID" => text(&self.case_id),
            "Status_Sales" => text(&self.status_sales),
            "Disputed_Amount" => amount(&self.disputed_amount),
            "Short_Description_of_Customer" => text(&self.short_description_of_customer),
            "Title" => text(&self.title),
            "Coordinator" => text(&self.coordinator),
            "Processor" => text(&self.processor),
            "Category" => text(&self.category),
            "Category_Description" => text(&self.category_description),
            "Status" => match self.status {
                Some(s) => FieldValue::Text(s.as_str()),
                None => FieldValue::Null,
            },
            "Root_Cause" => text(&self.root_cause),
            "Message" => {
                if self.message.is_empty() {
                    FieldValue::Null
                } else {
                    FieldValue::Text(&self.message)
                }
            }
            _ => return None,
        };

        Some(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
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
            debitor: None,
            head_office: None,
            external_reference: None,
        }
    }

    #[test]
    fn test_field_lookup_distinguishes_null_from_empty() {
        let mut case = ClosingCase::from_line_item(&line("4100001", "A1"));
        assert_eq!(case.field("Status_Sales"), Some(FieldValue::Null));

        case.status_sales = Some(String::new());
        assert_eq!(case.field("Status_Sales"), Some(FieldValue::Text("")));
    }

    #[test]
    fn test_field_lookup_rejects_unknown_name() {
        let case = ClosingCase::from_line_item(&line("4100001", "A1"));
        assert!(case.field("Amount_DC").is_none());
    }

    #[test]
    fn test_known_fields_all_resolve() {
        let case = ClosingCase::from_line_item(&line("4100001", "A1"));
        for name in KNOWN_FIELDS {
            assert!(case.field(name).is_some(), "field {} must resolve", name);
        }
    }

    #[test]
    fn test_warning_set_preserves_insertion_order_without_duplicates() {
        let mut warnings = WarningSet::default();
        warnings.record("ORPHAN_CASE");
        warnings.record("DUPLICATE_LINE");
        warnings.record("ORPHAN_CASE");

        assert_eq!(warnings.len(), 2);
        let collected: Vec<&str> = warnings.iter().collect();
        assert_eq!(collected, vec!["ORPHAN_CASE", "DUPLICATE_LINE"]);
    }

    #[test]
    fn test_status_serde_snake_case() {
        let status: Status = serde_yaml::from_str("open").unwrap();
        assert_eq!(status, Status::Open);
        assert_eq!(status.as_str(), "Open");
    }
}
