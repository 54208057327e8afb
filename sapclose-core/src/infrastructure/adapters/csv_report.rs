// sapclose-core/src/infrastructure/adapters/csv_report.rs

use std::path::Path;

use crate::domain::report::ReportTable;
use crate::error::SapcloseError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::ReportWriter;

/// Report writer producing semicolon-separated CSV. A spreadsheet-producing
/// implementation can replace it behind the same port; the sheet name only
/// matters to those.
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    delimiter: u8,
}

impl CsvReportWriter {
    pub fn new() -> Self {
        Self { delimiter: b';' }
    }
}

impl Default for CsvReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWriter for CsvReportWriter {
    fn write(
        &self,
        table: &ReportTable,
        target: &Path,
        _sheet_name: &str,
    ) -> Result<(), SapcloseError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        // headers read better with spaces; field handling elsewhere keeps
        // the underscore names
        let header: Vec<String> = table
            .columns
            .iter()
            .map(|c| c.replace('_', " "))
            .collect();
        writer
            .write_record(&header)
            .map_err(|e| SapcloseError::InternalError(format!("CSV serialization: {e}")))?;

        for row in &table.rows {
            writer
                .write_record(row)
                .map_err(|e| SapcloseError::InternalError(format!("CSV serialization: {e}")))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| SapcloseError::InternalError(format!("CSV serialization: {e}")))?;

        // staged atomically: the file exists complete or not at all
        atomic_write(target, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_writes_header_and_rows() -> Result<()> {
        let table = ReportTable {
            columns: vec!["Document_Number".to_string(), "DC_Amount".to_string()],
            rows: vec![
                vec!["4100001".to_string(), "-150.00".to_string()],
                vec!["4100002".to_string(), String::new()],
            ],
        };

        let dir = tempdir()?;
        let target = dir.path().join("closing_DE_CC01.csv");
        CsvReportWriter::new().write(&table, &target, "Closing")?;

        let content = fs::read_to_string(&target)?;
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Document Number;DC Amount"));
        assert_eq!(lines.next(), Some("4100001;-150.00"));
        assert_eq!(lines.next(), Some("4100002;"));
        Ok(())
    }
}
