// sapclose-core/src/infrastructure/config/app.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

use crate::domain::model::Recipient;
use crate::infrastructure::error::InfrastructureError;

/// Placeholder in the FBL5N filename pattern, expanded once per sub-export.
pub const TYPE_PLACEHOLDER: &str = "$type$";
/// Placeholders in the report filename pattern, expanded once per group.
pub const COUNTRY_PLACEHOLDER: &str = "$country$";
pub const COMPANY_CODE_PLACEHOLDER: &str = "$company_code$";

/// Token in path values replaced by the config file's own directory, so a
/// project stays relocatable.
const APPDIR_PLACEHOLDER: &str = "$appdir$";

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub data: DataConfig,
    #[validate(nested)]
    pub reports: ReportConfig,
    #[validate(nested)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct DataConfig {
    #[validate(length(min = 1))]
    pub export_dir: String,

    /// Filename pattern of the FBL5N export, with a `$type$` placeholder for
    /// the sub-export kind.
    #[validate(length(min = 1), custom(function = "validate_type_pattern"))]
    pub fbl5n_export_name: String,

    /// Sub-exports to normalize; missing files other than the first one are
    /// tolerated (there may simply be no cleared items in the window).
    #[serde(default = "default_fbl5n_types")]
    pub fbl5n_types: Vec<String>,

    #[validate(length(min = 1))]
    pub dms_export_name: String,

    /// How many past days the extraction collaborator pulled. The engine
    /// never filters on it — it only scopes the lock and the reporting.
    #[serde(default = "default_days_closed")]
    pub days_closed: u32,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl DataConfig {
    pub fn fbl5n_export_paths(&self) -> Vec<PathBuf> {
        self.fbl5n_types
            .iter()
            .map(|ty| {
                Path::new(&self.export_dir).join(self.fbl5n_export_name.replace(TYPE_PLACEHOLDER, ty))
            })
            .collect()
    }

    pub fn dms_export_path(&self) -> PathBuf {
        Path::new(&self.export_dir).join(&self.dms_export_name)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ReportConfig {
    /// Local staging directory; reports are fully written here before any of
    /// them moves to the share.
    #[validate(length(min = 1))]
    pub local_report_dir: String,

    /// Root of the shared distribution location.
    #[validate(length(min = 1))]
    pub net_report_dir: String,

    /// strftime layout of the dated subdirectory created per run.
    #[serde(default = "default_subdir_format")]
    pub net_report_subdir_format: String,

    #[validate(length(min = 1), custom(function = "validate_report_pattern"))]
    pub report_name: String,

    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Column order of every report of the run. Fixed schema: a field with
    /// no value renders empty, it is never dropped.
    #[validate(length(min = 1))]
    pub field_order: Vec<String>,
}

impl ReportConfig {
    pub fn report_file_name(&self, country: &str, company_code: &str) -> String {
        self.report_name
            .replace(COUNTRY_PLACEHOLDER, country)
            .replace(COMPANY_CODE_PLACEHOLDER, company_code)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NotificationConfig {
    /// Master switch: off still produces every artifact, only transport is
    /// suppressed (dry-run verification).
    #[serde(default)]
    pub send: bool,

    #[validate(length(min = 1))]
    pub sender: String,

    #[validate(length(min = 1))]
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Subject pattern; `$date$` is substituted at composition time.
    #[validate(length(min = 1))]
    pub subject: String,

    #[validate(length(min = 1))]
    pub template_path: String,

    #[validate(length(min = 1))]
    pub notification_dir: String,

    #[serde(default = "default_summary_name")]
    pub summary_name: String,

    #[serde(default = "default_notification_name")]
    pub notification_name: String,

    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

fn default_fbl5n_types() -> Vec<String> {
    vec!["open".to_string(), "cleared".to_string()]
}
fn default_days_closed() -> u32 {
    14
}
fn default_delimiter() -> char {
    '|'
}
fn default_subdir_format() -> String {
    "%Y-%m-%d".to_string()
}
fn default_sheet_name() -> String {
    "Closing".to_string()
}
fn default_smtp_port() -> u16 {
    25
}
fn default_summary_name() -> String {
    "summary.html".to_string()
}
fn default_notification_name() -> String {
    "notification.html".to_string()
}

fn validate_type_pattern(value: &str) -> Result<(), ValidationError> {
    if value.contains(TYPE_PLACEHOLDER) {
        Ok(())
    } else {
        Err(ValidationError::new("missing_type_placeholder"))
    }
}

fn validate_report_pattern(value: &str) -> Result<(), ValidationError> {
    if value.contains(COUNTRY_PLACEHOLDER) && value.contains(COMPANY_CODE_PLACEHOLDER) {
        Ok(())
    } else {
        Err(ValidationError::new("missing_report_placeholders"))
    }
}

// --- LOADER ---

/// Loads and validates the application configuration. Any required key left
/// empty fails here, before a single export byte is read.
#[instrument(skip(config_path))]
pub fn load_app_config(config_path: &Path) -> Result<AppConfig, InfrastructureError> {
    info!(path = ?config_path, "Loading application configuration");

    let content = fs::read_to_string(config_path)
        .map_err(|_| InfrastructureError::ConfigNotFound(config_path.display().to_string()))?;

    // $appdir$ -> the directory the config file lives in
    let app_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .display()
        .to_string();
    let content = content.replace(APPDIR_PLACEHOLDER, &app_dir);

    let mut config: AppConfig = serde_yaml::from_str(&content)?;

    apply_env_overrides(&mut config);

    if !config.data.delimiter.is_ascii() {
        return Err(InfrastructureError::Config(format!(
            "delimiter '{}' is not a single-byte character",
            config.data.delimiter
        )));
    }

    config
        .validate()
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) {
    // Permet par exemple : SAPCLOSE_EXPORT_DIR=/tmp/exports sapclose run
    if let Ok(val) = std::env::var("SAPCLOSE_EXPORT_DIR") {
        info!(old = ?config.data.export_dir, new = ?val, "Overriding export dir via ENV");
        config.data.export_dir = val;
    }
    if let Ok(val) = std::env::var("SAPCLOSE_NET_REPORT_DIR") {
        info!(old = ?config.reports.net_report_dir, new = ?val, "Overriding net report dir via ENV");
        config.reports.net_report_dir = val;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::TempDir;

    fn minimal_config() -> String {
        r#"
data:
  export_dir: $appdir$/exports
  fbl5n_export_name: FBL5N_$type$.txt
  dms_export_name: DMS_export.txt
reports:
  local_report_dir: $appdir$/reports
  net_report_dir: $appdir$/share
  report_name: closing_$country$_$company_code$.csv
  field_order: [Document_Number, DC_Amount, Status]
notifications:
  sender: closing@example.com
  host: smtp.example.com
  subject: "Closing results $date$"
  template_path: $appdir$/template.html
  notification_dir: $appdir$/notifications
  recipients:
    - { name: Jan, surname: Novak, mail: jan.novak@example.com, country: All }
"#
        .to_string()
    }

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("closing_conf.yaml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_expands_appdir_and_applies_defaults() -> Result<()> {
        let (dir, path) = write_config(&minimal_config());
        let config = load_app_config(&path)?;

        assert!(config.data.export_dir.starts_with(&dir.path().display().to_string()));
        assert_eq!(config.data.delimiter, '|');
        assert_eq!(config.data.fbl5n_types, vec!["open", "cleared"]);
        assert_eq!(config.reports.sheet_name, "Closing");
        assert_eq!(config.notifications.port, 25);
        assert!(!config.notifications.send);

        let paths = config.data.fbl5n_export_paths();
        assert!(paths[0].ends_with("FBL5N_open.txt"));
        assert!(paths[1].ends_with("FBL5N_cleared.txt"));
        Ok(())
    }

    #[test]
    fn test_empty_required_key_fails_before_processing() {
        let broken = minimal_config().replace("dms_export_name: DMS_export.txt", "dms_export_name: \"\"");
        let (_dir, path) = write_config(&broken);

        assert!(matches!(
            load_app_config(&path).unwrap_err(),
            InfrastructureError::Config(_)
        ));
    }

    #[test]
    fn test_report_name_without_placeholders_rejected() {
        let broken = minimal_config().replace(
            "report_name: closing_$country$_$company_code$.csv",
            "report_name: closing.csv",
        );
        let (_dir, path) = write_config(&broken);

        assert!(matches!(
            load_app_config(&path).unwrap_err(),
            InfrastructureError::Config(_)
        ));
    }

    #[test]
    fn test_missing_config_file_reported() {
        let err = load_app_config(Path::new("/nonexistent/closing_conf.yaml")).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
    }

    #[test]
    fn test_report_file_name_expansion() -> Result<()> {
        let (_dir, path) = write_config(&minimal_config());
        let config = load_app_config(&path)?;

        assert_eq!(
            config.reports.report_file_name("DE", "CC01"),
            "closing_DE_CC01.csv"
        );
        Ok(())
    }
}
