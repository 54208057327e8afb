// sapclose-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid rule '{rule}': {reason}")]
    #[diagnostic(
        code(sapclose::domain::invalid_rule),
        help("Fix the rule definition in rules.yaml before re-running.")
    )]
    InvalidRule { rule: String, reason: String },

    #[error("Rule '{rule}' references unknown field '{field}'")]
    #[diagnostic(
        code(sapclose::domain::unknown_field),
        help("Field names are case-sensitive and must match the case layout (e.g. 'DC_Amount').")
    )]
    UnknownField { rule: String, field: String },

    #[error("Notification template references unpopulated placeholder '{placeholder}'")]
    #[diagnostic(
        code(sapclose::domain::template_field_missing),
        help("Recognized placeholders: $date$, $report_path$, $summary_rows$.")
    )]
    TemplateFieldMissing { placeholder: String },
}
