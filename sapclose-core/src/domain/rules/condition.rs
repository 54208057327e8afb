// sapclose-core/src/domain/rules/condition.rs

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::model::{ClosingCase, FieldValue};

/// Predicate over the fields of one case, loaded from rules.yaml.
///
/// Conditions may reference fields assigned by earlier rules in the same pass
/// (`Status`, `Root_Cause`, `Message`), which is what makes rule chaining
/// work. Field names are checked against the known field set at load time —
/// an unknown name rejects the whole rule set, it is never treated as false.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Text equality. A null field never equals anything, including "".
    Equals { field: String, value: String },
    /// Text inequality. A null field is unequal to every value.
    NotEquals { field: String, value: String },
    /// Strict numeric comparison on an amount field; null is never greater.
    GreaterThan { field: String, amount: BigDecimal },
    LessThan { field: String, amount: BigDecimal },
    /// Date lies further in the past than `days` before the run date.
    OlderThanDays { field: String, days: i64 },
    /// Date lies within the last `days` days up to the run date.
    WithinDays { field: String, days: i64 },
    IsNull { field: String },
    NotNull { field: String },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Collects every field name this condition (transitively) references.
    pub fn referenced_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Equals { field, .. }
            | Self::NotEquals { field, .. }
            | Self::GreaterThan { field, .. }
            | Self::LessThan { field, .. }
            | Self::OlderThanDays { field, .. }
            | Self::WithinDays { field, .. }
            | Self::IsNull { field }
            | Self::NotNull { field } => out.push(field.as_str()),
            Self::All(inner) | Self::Any(inner) => {
                for condition in inner {
                    condition.referenced_fields(out);
                }
            }
            Self::Not(inner) => inner.referenced_fields(out),
        }
    }

    pub fn evaluate(&self, case: &ClosingCase, run_date: NaiveDate) -> bool {
        match self {
            Self::Equals { field, value } => matches_eq(lookup(case, field), value),
            Self::NotEquals { field, value } => !matches_eq(lookup(case, field), value),
            Self::GreaterThan { field, amount } => match lookup(case, field) {
                FieldValue::Amount(a) => a > amount,
                _ => false,
            },
            Self::LessThan { field, amount } => match lookup(case, field) {
                FieldValue::Amount(a) => a < amount,
                _ => false,
            },
            Self::OlderThanDays { field, days } => match lookup(case, field) {
                FieldValue::Date(d) => (run_date - d).num_days() > *days,
                _ => false,
            },
            Self::WithinDays { field, days } => match lookup(case, field) {
                FieldValue::Date(d) => {
                    let elapsed = (run_date - d).num_days();
                    (0..=*days).contains(&elapsed)
                }
                _ => false,
            },
            Self::IsNull { field } => matches!(lookup(case, field), FieldValue::Null),
            Self::NotNull { field } => !matches!(lookup(case, field), FieldValue::Null),
            Self::All(inner) => inner.iter().all(|c| c.evaluate(case, run_date)),
            Self::Any(inner) => inner.iter().any(|c| c.evaluate(case, run_date)),
            Self::Not(inner) => !inner.evaluate(case, run_date),
        }
    }
}

/// Field names were validated at load time, so a failed lookup here can only
/// mean the registry and the validator went out of sync; treat it as null
/// rather than panicking mid-batch.
fn lookup<'a>(case: &'a ClosingCase, field: &str) -> FieldValue<'a> {
    case.field(field).unwrap_or(FieldValue::Null)
}

fn matches_eq(value: FieldValue<'_>, expected: &str) -> bool {
    match value {
        FieldValue::Text(s) => s == expected,
        FieldValue::Amount(a) => BigDecimal::from_str(expected)
            .map(|e| *a == e)
            .unwrap_or(false),
        FieldValue::Date(d) => NaiveDate::parse_from_str(expected, "%Y-%m-%d")
            .map(|e| d == e)
            .unwrap_or(false),
        FieldValue::Null => false,
    }
}
