// sapclose-core/src/infrastructure/export/table.rs

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::infrastructure::error::InfrastructureError;

/// One data row of a delimited export, addressed by column name.
pub struct RowView<'a> {
    file: &'a str,
    record: &'a StringRecord,
    index: &'a HashMap<String, usize>,
    pub line: u64,
}

impl<'a> RowView<'a> {
    /// Returns the trimmed cell value, or `None` when the cell is blank or
    /// the column does not exist. Blank stays distinguishable from a value.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let &idx = self.index.get(column)?;
        let value = self.record.get(idx)?.trim();
        if value.is_empty() { None } else { Some(value) }
    }

    /// Like [`RowView::get`], but a blank cell is a shape error.
    pub fn require(&self, column: &str) -> Result<&'a str, InfrastructureError> {
        self.get(column)
            .ok_or_else(|| self.malformed(format!("column '{column}' is empty")))
    }

    pub fn malformed(&self, reason: impl Into<String>) -> InfrastructureError {
        InfrastructureError::MalformedExport {
            file: self.file.to_string(),
            line: self.line,
            reason: reason.into(),
        }
    }
}

/// Reads a delimited export with a header row and hands each data row to the
/// caller's parser.
///
/// Shape rules: every required column must appear in the header, and every
/// row must carry exactly as many fields as the header. Extra, unknown
/// columns are ignored — exports gain fields over time and that must not
/// break the run. Shape violations name the file and line.
pub fn read_rows<T>(
    path: &Path,
    delimiter: u8,
    required: &[&str],
    mut parse: impl FnMut(&RowView<'_>) -> Result<T, InfrastructureError>,
) -> Result<Vec<T>, InfrastructureError> {
    let file_label = path.display().to_string();

    if !path.is_file() {
        return Err(InfrastructureError::ExportNotFound(file_label));
    }

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| InfrastructureError::MalformedExport {
            file: file_label.clone(),
            line: 1,
            reason: format!("unreadable header row: {e}"),
        })?
        .clone();

    let mut index: HashMap<String, usize> = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        index.entry(name.trim().to_string()).or_insert(idx);
    }

    for column in required {
        if !index.contains_key(*column) {
            return Err(InfrastructureError::MalformedExport {
                file: file_label.clone(),
                line: 1,
                reason: format!("missing required column '{column}'"),
            });
        }
    }

    let width = headers.len();
    let mut out = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| InfrastructureError::MalformedExport {
            file: file_label.clone(),
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != width {
            return Err(InfrastructureError::MalformedExport {
                file: file_label.clone(),
                line,
                reason: format!(
                    "row has {} fields, header has {}",
                    record.len(),
                    width
                ),
            });
        }

        let row = RowView {
            file: &file_label,
            record: &record,
            index: &index,
            line,
        };
        out.push(parse(&row)?);
    }

    Ok(out)
}
