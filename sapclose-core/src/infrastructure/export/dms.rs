// sapclose-core/src/infrastructure/export/dms.rs

use std::path::Path;

use tracing::instrument;

use crate::domain::model::RawCaseRecord;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::export::fields::parse_sap_amount;
use crate::infrastructure::export::table::read_rows;

pub const REQUIRED_COLUMNS: &[&str] = &[
    "Case_ID",
    "Status_Sales",
    "Disputed_Amount",
    "Short_Description_of_Customer",
    "Title",
    "Coordinator",
    "Processor",
    "Category",
    "Category_Description",
    "Document_Number",
    "Document_Assignment",
];

/// Normalizes the DMS dispute export into typed case records. Zero-or-one
/// record per dispute case; the correlation key back to the accounting lines
/// travels in the `Document_Number` / `Document_Assignment` columns.
#[instrument(skip(path), fields(file = %path.display()))]
pub fn read_case_records(
    path: &Path,
    delimiter: u8,
) -> Result<Vec<RawCaseRecord>, InfrastructureError> {
    read_rows(path, delimiter, REQUIRED_COLUMNS, |row| {
        let disputed_amount = row
            .get("Disputed_Amount")
            .map(|raw| parse_sap_amount(raw).map_err(|reason| row.malformed(reason)))
            .transpose()?;

        Ok(RawCaseRecord {
            case_id: row.require("Case_ID")?.to_string(),
            status_sales: row.get("Status_Sales").map(str::to_string),
            disputed_amount,
            short_description_of_customer: row
                .get("Short_Description_of_Customer")
                .map(str::to_string),
            title: row.get("Title").map(str::to_string),
            coordinator: row.get("Coordinator").map(str::to_string),
            processor: row.get("Processor").map(str::to_string),
            category: row.get("Category").map(str::to_string),
            category_description: row.get("Category_Description").map(str::to_string),
            document_number: row.get("Document_Number").map(str::to_string),
            document_assignment: row.get("Document_Assignment").map(str::to_string),
        })
    })
}
