// sapclose-core/src/domain/report.rs

use crate::domain::grouping::ReportGroup;
use crate::domain::model::{ClosingCase, FieldValue};

/// Date layout used when rendering calendar fields into report cells.
pub const REPORT_DATE_FORMAT: &str = "%d.%m.%Y";

/// One ordered dataset handed to the report writer collaborator. The column
/// set is fixed by configuration and identical across every group of a run,
/// so downstream consumers can rely on a stable schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Builds the dataset for one report group. Columns follow the configured
/// field order exactly; a field with no value renders as an empty cell, never
/// as a dropped column. Row order is the merger insertion order.
pub fn assemble(
    group: &ReportGroup,
    cases: &[ClosingCase],
    field_order: &[String],
) -> ReportTable {
    let rows = group
        .case_indexes
        .iter()
        .map(|&idx| {
            let case = &cases[idx];
            field_order
                .iter()
                .map(|field| render_field(case, field))
                .collect()
        })
        .collect();

    ReportTable {
        columns: field_order.to_vec(),
        rows,
    }
}

/// Renders one case field into its report cell text.
pub fn render_field(case: &ClosingCase, field: &str) -> String {
    // Warnings is report-only vocabulary: it is a collection, not a scalar,
    // so it lives outside the rule-condition field registry.
    if field == "Warnings" {
        return case.warnings.to_string();
    }

    match case.field(field) {
        Some(FieldValue::Text(s)) => s.to_string(),
        Some(FieldValue::Amount(a)) => a.round(2).to_string(),
        Some(FieldValue::Date(d)) => d.format(REPORT_DATE_FORMAT).to_string(),
        Some(FieldValue::Null) | None => String::new(),
    }
}
