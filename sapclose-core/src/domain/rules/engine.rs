// sapclose-core/src/domain/rules/engine.rs

use chrono::NaiveDate;

use crate::domain::model::{ClosingCase, Status};
use crate::domain::rules::rule::RuleSet;

/// Evaluates the ordered rule set against one case at a time.
///
/// The case itself is the mutable accumulator: each matching rule sees the
/// fields written by the rules before it, which keeps chaining explicit and
/// parallel evaluation across cases safe (no ambient state).
pub struct RuleEngine<'a> {
    rule_set: &'a RuleSet,
    run_date: NaiveDate,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rule_set: &'a RuleSet, run_date: NaiveDate) -> Self {
        Self { rule_set, run_date }
    }

    /// Classifies one case. Total: the case always ends up with a status.
    /// Deterministic: same rule set + same case = same classification.
    pub fn classify(&self, case: &mut ClosingCase) {
        for rule in &self.rule_set.rules {
            if !rule.when.evaluate(case, self.run_date) {
                continue;
            }

            for code in &rule.then.add_warnings {
                case.warnings.record(code.clone());
            }
            if let Some(root_cause) = &rule.then.set_root_cause {
                case.root_cause = Some(root_cause.clone());
            }
            if let Some(status) = rule.then.set_status {
                case.status = Some(status);
            }
            if let Some(message) = &rule.then.set_message
                && !message.is_empty()
            {
                case.message = message.clone();
            }
        }

        if case.status.is_none() {
            case.status = Some(self.default_status(case));
        }
    }

    /// Fallback when no rule assigned a status: no dispute data at all means
    /// the item is unresolved; otherwise the raw sales status is mapped
    /// through the configured status map, and anything unmapped stays open.
    fn default_status(&self, case: &ClosingCase) -> Status {
        if !case.has_case_data() {
            return Status::Unresolved;
        }
        if let Some(raw) = case.status_sales.as_deref()
            && let Some(mapped) = self.rule_set.status_map.get(raw)
        {
            return *mapped;
        }
        Status::Open
    }
}
