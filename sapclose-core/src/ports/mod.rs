// sapclose-core/src/ports/mod.rs

pub mod collaborators;

pub use collaborators::{Mailer, OutboundMessage, ReportWriter, ShareUploader};
