// sapclose-core/src/infrastructure/runlock.rs

use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::infrastructure::error::InfrastructureError;

/// Run-level lock keyed by run date. Two schedulers firing the same day must
/// not process the same extraction window twice; the second acquisition
/// fails fast instead of racing.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(dir: &Path, run_date: NaiveDate) -> Result<Self, InfrastructureError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("closing_{run_date}.lock"));

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(InfrastructureError::RunLocked { run_date })
            }
            Err(e) => Err(InfrastructureError::Io(e)),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = ?self.path, error = %e, "Could not remove run lock file");
        }
    }
}
