// sapclose-core/src/infrastructure/config/state.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

/// Runtime state persisted between runs. Only `last_run` today; kept as a
/// struct so later states land in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStates {
    pub last_run: Option<NaiveDate>,
}

/// A missing state file is a first run, not an error.
pub fn load_states(path: &Path) -> Result<RunStates, InfrastructureError> {
    if !path.is_file() {
        return Ok(RunStates::default());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| InfrastructureError::Config(format!("invalid state file {path:?}: {e}")))
}

pub fn save_states(path: &Path, states: &RunStates) -> Result<(), InfrastructureError> {
    info!(?path, last_run = ?states.last_run, "Saving runtime states");
    let content = serde_json::to_string_pretty(states)
        .map_err(|e| InfrastructureError::Config(format!("state serialization: {e}")))?;
    atomic_write(path, content)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_missing_state_file_is_first_run() -> Result<()> {
        let states = load_states(Path::new("/nonexistent/states.json"))?;
        assert_eq!(states, RunStates::default());
        Ok(())
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("states.json");

        let states = RunStates {
            last_run: NaiveDate::from_ymd_opt(2022, 5, 13),
        };
        save_states(&path, &states)?;

        assert_eq!(load_states(&path)?, states);
        Ok(())
    }

    #[test]
    fn test_corrupt_state_file_reported() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("states.json");
        fs::write(&path, "not-json")?;

        assert!(matches!(
            load_states(&path).unwrap_err(),
            InfrastructureError::Config(_)
        ));
        Ok(())
    }
}
