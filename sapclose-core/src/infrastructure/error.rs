// sapclose-core/src/infrastructure/error.rs

use chrono::NaiveDate;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(sapclose::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(sapclose::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(sapclose::infra::config))]
    Config(String),

    #[error("Configuration not found at '{0}'")]
    #[diagnostic(code(sapclose::infra::config_missing))]
    ConfigNotFound(String),

    // --- EXPORT PARSING ---
    #[error("Malformed export '{file}' at line {line}: {reason}")]
    #[diagnostic(
        code(sapclose::infra::malformed_export),
        help("The run aborts on bad input shape; re-extract the file rather than patching it.")
    )]
    MalformedExport {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("Export file not found at '{0}'")]
    #[diagnostic(code(sapclose::infra::export_missing))]
    ExportNotFound(String),

    // --- RUN LOCK ---
    #[error("A closing run for {run_date} is already in progress")]
    #[diagnostic(
        code(sapclose::infra::run_locked),
        help("Wait for the other run to finish, or remove the stale .lock file if it crashed.")
    )]
    RunLocked { run_date: NaiveDate },
}
