// sapclose-core/src/infrastructure/export/fbl5n.rs

use std::path::Path;

use tracing::instrument;

use crate::domain::model::RawLineItem;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::export::fields::{parse_export_date, parse_sap_amount};
use crate::infrastructure::export::table::read_rows;

/// Columns the open-item export must carry. The extraction layout may add
/// more; those are ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Document_Number",
    "Document_Assignment",
    "Clearing_Document",
    "DC_Amount",
    "Company_Code",
    "Country",
    "Created_On",
    "Created_By",
    "Debitor",
    "Head_Office",
    "External_Reference",
];

/// Normalizes one FBL5N export file into typed line items.
#[instrument(skip(path), fields(file = %path.display()))]
pub fn read_line_items(
    path: &Path,
    delimiter: u8,
) -> Result<Vec<RawLineItem>, InfrastructureError> {
    read_rows(path, delimiter, REQUIRED_COLUMNS, |row| {
        let dc_amount = row
            .get("DC_Amount")
            .map(|raw| parse_sap_amount(raw).map_err(|reason| row.malformed(reason)))
            .transpose()?;
        let created_on = row
            .get("Created_On")
            .map(|raw| parse_export_date(raw).map_err(|reason| row.malformed(reason)))
            .transpose()?;

        Ok(RawLineItem {
            document_number: row.require("Document_Number")?.to_string(),
            // an empty assignment is a legitimate key half, not an error
            document_assignment: row.get("Document_Assignment").unwrap_or("").to_string(),
            clearing_document: row.get("Clearing_Document").map(str::to_string),
            dc_amount,
            company_code: row.get("Company_Code").map(str::to_string),
            country: row.get("Country").map(str::to_string),
            created_on,
            created_by: row.get("Created_By").map(str::to_string),
            debitor: row.get("Debitor").map(str::to_string),
            head_office: row.get("Head_Office").map(str::to_string),
            external_reference: row.get("External_Reference").map(str::to_string),
        })
    })
}
