// sapclose-core/src/infrastructure/adapters/share.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::SapcloseError;
use crate::ports::ShareUploader;

/// Moves staged report files into a dated subdirectory of the shared
/// network location, creating the subdirectory on first use.
#[derive(Debug, Clone)]
pub struct DatedShareUploader {
    root: PathBuf,
}

impl DatedShareUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShareUploader for DatedShareUploader {
    fn upload(
        &self,
        staged: &[PathBuf],
        dated_subdir: &str,
    ) -> Result<Vec<PathBuf>, SapcloseError> {
        let dest_dir = self.root.join(dated_subdir);
        fs::create_dir_all(&dest_dir)?;

        let mut uploaded = Vec::with_capacity(staged.len());
        for path in staged {
            let file_name = path.file_name().ok_or_else(|| {
                SapcloseError::InternalError(format!("staged path without file name: {path:?}"))
            })?;
            let dest = dest_dir.join(file_name);
            info!(from = ?path, to = ?dest, "Moving report to share");
            move_file(path, &dest)?;
            uploaded.push(dest);
        }

        Ok(uploaded)
    }
}

/// Rename when possible; shares are often on another filesystem, where only
/// copy + remove works.
fn move_file(from: &Path, to: &Path) -> Result<(), SapcloseError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}
