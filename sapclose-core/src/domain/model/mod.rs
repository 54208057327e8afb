// sapclose-core/src/domain/model/mod.rs

pub mod case;
pub mod recipient;
pub mod record;

// Re-exports
pub use case::{ClosingCase, FieldValue, Status, WarningSet, KNOWN_FIELDS};
pub use recipient::{CountryInterest, Recipient};
pub use record::{MergeKey, RawCaseRecord, RawLineItem};
