// sapclose-core/src/infrastructure/config/rules.rs

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::domain::model::Status;
use crate::domain::rules::{ClosingRule, RuleSet};
use crate::infrastructure::error::InfrastructureError;

/// On-disk shape of rules.yaml: the ordered rule list, the raw-status
/// mapping, and the per-country switches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub status_map: HashMap<String, Status>,

    #[serde(default)]
    pub rules: Vec<ClosingRule>,

    #[serde(default)]
    pub countries: BTreeMap<String, CountrySettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountrySettings {
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RulesFile {
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(self.rules.clone(), self.status_map.clone())
    }

    /// Countries explicitly switched off. Anything not listed stays active.
    pub fn inactive_countries(&self) -> Vec<String> {
        self.countries
            .iter()
            .filter(|(_, settings)| !settings.active)
            .map(|(country, _)| country.clone())
            .collect()
    }
}

#[instrument(skip(path))]
pub fn load_rules(path: &Path) -> Result<RulesFile, InfrastructureError> {
    info!(path = ?path, "Loading closing rules");

    let content = fs::read_to_string(path)
        .map_err(|_| InfrastructureError::ConfigNotFound(path.display().to_string()))?;
    let rules: RulesFile = serde_yaml::from_str(&content)?;

    info!(rules = rules.rules.len(), "Closing rules loaded");
    Ok(rules)
}
