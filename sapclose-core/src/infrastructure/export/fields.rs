// sapclose-core/src/infrastructure/export/fields.rs

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

/// Converts an amount in SAP notation to a fixed-point decimal.
///
/// SAP prints `1.234,56-`: dot as thousands separator, comma as decimal
/// separator, trailing minus. Plain `1234.56` passes through unchanged so
/// already-normalized exports keep working. Floats are never involved —
/// financial sums must not drift.
pub fn parse_sap_amount(raw: &str) -> Result<BigDecimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty amount".to_string());
    }

    let (body, negative) = match trimmed.strip_suffix('-') {
        Some(body) => (body, true),
        None => (trimmed, false),
    };

    let normalized = if body.contains(',') {
        body.replace('.', "").replace(',', ".")
    } else {
        body.to_string()
    };

    let value = BigDecimal::from_str(&normalized)
        .map_err(|e| format!("invalid amount '{raw}': {e}"))?;

    Ok(if negative { -value } else { value })
}

/// Parses a calendar date as the exports print it (`02.05.2022`), accepting
/// the ISO form as well.
pub fn parse_export_date(raw: &str) -> Result<NaiveDate, String> {
    for format in ["%d.%m.%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), format) {
            return Ok(date);
        }
    }
    Err(format!("invalid date '{raw}'"))
}
