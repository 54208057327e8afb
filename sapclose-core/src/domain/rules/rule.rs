// sapclose-core/src/domain/rules/rule.rs

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::error::DomainError;
use crate::domain::model::{KNOWN_FIELDS, Status};
use crate::domain::rules::condition::Condition;

/// One user-authored classification rule. Position in the rule file is the
/// evaluation order: later rules win on `Status`/`Root_Cause`/`Message`, so
/// the more specific rules belong at the bottom.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClosingRule {
    pub name: String,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub when: Condition,
    #[serde(default)]
    pub then: Effect,
}

/// What a matching rule does to the case under evaluation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Effect {
    /// Warning codes to accumulate (set union, insertion order preserved).
    #[serde(default)]
    pub add_warnings: Vec<String>,
    /// Overwrites the root cause (last matching rule wins).
    #[serde(default)]
    pub set_root_cause: Option<String>,
    /// Overwrites the status (last matching rule wins).
    #[serde(default)]
    pub set_status: Option<Status>,
    /// Overwrites the message unless the new value is empty.
    #[serde(default)]
    pub set_message: Option<String>,
}

impl Effect {
    pub fn is_empty(&self) -> bool {
        self.add_warnings.is_empty()
            && self.set_root_cause.is_none()
            && self.set_status.is_none()
            && self.set_message.is_none()
    }
}

/// The full ordered rule set plus the configuration-owned mapping of raw
/// `Status_Sales` values to canonical statuses. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub rules: Vec<ClosingRule>,
    pub status_map: HashMap<String, Status>,
}

impl RuleSet {
    pub fn new(rules: Vec<ClosingRule>, status_map: HashMap<String, Status>) -> Self {
        Self { rules, status_map }
    }

    /// Validates the rule set against the known field registry. Runs before
    /// any case is evaluated: a misspelled field name must fail the run, not
    /// silently classify live financial data as "condition false".
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen_names: HashSet<&str> = HashSet::new();

        for rule in &self.rules {
            if rule.name.trim().is_empty() {
                return Err(DomainError::InvalidRule {
                    rule: "<unnamed>".to_string(),
                    reason: "rule name cannot be empty".to_string(),
                });
            }
            if !seen_names.insert(rule.name.as_str()) {
                return Err(DomainError::InvalidRule {
                    rule: rule.name.clone(),
                    reason: "duplicate rule name".to_string(),
                });
            }
            if rule.then.is_empty() {
                return Err(DomainError::InvalidRule {
                    rule: rule.name.clone(),
                    reason: "rule has no effect".to_string(),
                });
            }

            let mut fields = Vec::new();
            rule.when.referenced_fields(&mut fields);
            for field in fields {
                if !KNOWN_FIELDS.contains(&field) {
                    return Err(DomainError::UnknownField {
                        rule: rule.name.clone(),
                        field: field.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
