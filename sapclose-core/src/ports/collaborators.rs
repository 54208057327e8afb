// sapclose-core/src/ports/collaborators.rs

// This file defines what the closing pipeline needs from the outside world,
// without knowing how it's done. The engine reconciles and classifies; how a
// table becomes a spreadsheet, how files reach the share and how mail gets
// delivered are somebody else's problem behind these traits.

use std::path::{Path, PathBuf};

use crate::domain::report::ReportTable;
use crate::error::SapcloseError;

/// Persists one ordered report dataset under a target path. The sheet name is
/// part of the contract so spreadsheet-producing implementations stay stable
/// for downstream consumers.
pub trait ReportWriter: Send + Sync {
    fn write(
        &self,
        table: &ReportTable,
        target: &Path,
        sheet_name: &str,
    ) -> Result<(), SapcloseError>;
}

/// Moves finished report files into a dated subdirectory of the shared
/// distribution location. Called once, after every report of the run was
/// staged — never with a partial set.
pub trait ShareUploader: Send + Sync {
    fn upload(
        &self,
        staged: &[PathBuf],
        dated_subdir: &str,
    ) -> Result<Vec<PathBuf>, SapcloseError>;
}

/// A fully rendered message, ready for transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

/// Delivers one rendered notification. Transport concerns (SMTP session,
/// timeouts, retries) live entirely behind this trait.
pub trait Mailer: Send + Sync {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), SapcloseError>;
}
