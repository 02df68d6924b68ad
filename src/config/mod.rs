//! TOML configuration
//!
//! A `Config` returned by `Config::load` has been validated and its paths made
//! absolute. `run_settings` turns it into the typed settings the pipeline
//! consumes.

pub mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{CellAddress, Column, FieldMapping};
use crate::io::ExtractionSettings;
use crate::streaming::{RetryPolicy, RunSettings};

pub use error::ConfigError;

/// Log levels accepted in `[logging] level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(rename = "excel_settings")]
    pub excel: ExcelConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub student_files_folder: PathBuf,
    pub master_sheet_path: PathBuf,
    pub output_folder: PathBuf,
    #[serde(default = "default_backup_folder")]
    pub backup_folder: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcelConfig {
    pub student_worksheet_name: String,
    pub master_worksheet_name: String,
    pub student_id_cell: String,
    #[serde(default = "default_master_id_column")]
    pub master_id_column: String,
    pub mark_cells: Vec<String>,
    pub master_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub max_concurrent_files: usize,
    pub backup_enabled: bool,
    pub skip_invalid_files: bool,
    pub timeout_seconds: u64,
    /// Total attempts per file, including the first
    pub retry_attempts: u32,
    /// Backoff unit; the wait after attempt `n` is `n * retry_backoff_ms`
    pub retry_backoff_ms: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: 10,
            backup_enabled: true,
            skip_invalid_files: true,
            timeout_seconds: 300,
            retry_attempts: 3,
            retry_backoff_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

fn default_backup_folder() -> PathBuf {
    PathBuf::from("./backups")
}

fn default_master_id_column() -> String {
    "B".to_string()
}

impl Config {
    /// Read, validate and resolve a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.resolve_paths()?;
        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse and validate without touching the filesystem
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = &self.paths;
        require_path("student_files_folder", &paths.student_files_folder)?;
        require_path("master_sheet_path", &paths.master_sheet_path)?;
        require_path("output_folder", &paths.output_folder)?;
        if self.processing.backup_enabled {
            require_path("backup_folder", &paths.backup_folder)?;
        }

        let is_xlsx = paths
            .master_sheet_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if !is_xlsx {
            return Err(ConfigError::Invalid(format!(
                "master_sheet_path must be an .xlsx file: {}",
                paths.master_sheet_path.display()
            )));
        }

        let excel = &self.excel;
        if excel.student_worksheet_name.trim().is_empty() {
            return Err(invalid("student_worksheet_name cannot be empty"));
        }
        if excel.master_worksheet_name.trim().is_empty() {
            return Err(invalid("master_worksheet_name cannot be empty"));
        }
        if excel.mark_cells.len() != excel.master_columns.len() {
            return Err(invalid(
                "mark_cells and master_columns must have the same length",
            ));
        }
        if excel.mark_cells.is_empty() {
            return Err(invalid("mark_cells cannot be empty"));
        }

        // Surfaces malformed addresses with the offending field named
        let (_, id_column, mapping) = self.parse_addresses()?;
        if mapping.destinations().any(|column| *column == id_column) {
            return Err(ConfigError::Invalid(format!(
                "master_id_column {} cannot also be a mark destination",
                id_column
            )));
        }

        if self.processing.max_concurrent_files == 0 {
            return Err(invalid("max_concurrent_files must be greater than 0"));
        }
        if self.processing.timeout_seconds == 0 {
            return Err(invalid("timeout_seconds must be greater than 0"));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging level must be one of {}: {}",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Make every configured path absolute against the working directory
    pub fn resolve_paths(&mut self) -> Result<(), ConfigError> {
        let paths = &mut self.paths;
        paths.student_files_folder = absolute("student_files_folder", &paths.student_files_folder)?;
        paths.master_sheet_path = absolute("master_sheet_path", &paths.master_sheet_path)?;
        paths.output_folder = absolute("output_folder", &paths.output_folder)?;
        paths.backup_folder = absolute("backup_folder", &paths.backup_folder)?;
        Ok(())
    }

    /// Create the output and backup folders if missing
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        let mut dirs = vec![&self.paths.output_folder];
        if self.processing.backup_enabled {
            dirs.push(&self.paths.backup_folder);
        }
        for dir in dirs {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn run_settings(&self) -> Result<RunSettings, ConfigError> {
        let (id_cell, master_id_column, mapping) = self.parse_addresses()?;
        let processing = &self.processing;

        Ok(RunSettings {
            source_root: self.paths.student_files_folder.clone(),
            master_path: self.paths.master_sheet_path.clone(),
            output_dir: self.paths.output_folder.clone(),
            backup_dir: self.paths.backup_folder.clone(),
            extraction: ExtractionSettings {
                sheet: self.excel.student_worksheet_name.clone(),
                id_cell,
                mapping,
            },
            master_sheet: self.excel.master_worksheet_name.clone(),
            master_id_column,
            max_concurrent_files: processing.max_concurrent_files,
            backup_enabled: processing.backup_enabled,
            skip_invalid_files: processing.skip_invalid_files,
            timeout: Duration::from_secs(processing.timeout_seconds),
            retry: RetryPolicy::new(
                processing.retry_attempts,
                Duration::from_millis(processing.retry_backoff_ms),
            ),
        })
    }

    fn parse_addresses(&self) -> Result<(CellAddress, Column, FieldMapping), ConfigError> {
        let excel = &self.excel;
        let id_cell = CellAddress::parse(&excel.student_id_cell).map_err(|source| {
            ConfigError::Address {
                field: "student_id_cell",
                source,
            }
        })?;
        let id_column =
            Column::parse(&excel.master_id_column).map_err(|source| ConfigError::Address {
                field: "master_id_column",
                source,
            })?;
        let mapping = FieldMapping::parse(&excel.mark_cells, &excel.master_columns).map_err(
            |source| ConfigError::Address {
                field: "mark_cells/master_columns",
                source,
            },
        )?;
        Ok((id_cell, id_column, mapping))
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

fn require_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn absolute(field: &'static str, path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path).map_err(|source| ConfigError::ResolvePath { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
[paths]
student_files_folder = "./student_files"
master_sheet_path = "./master.xlsx"
output_folder = "./output"
backup_folder = "./backups"

[excel_settings]
student_worksheet_name = "Grading Sheet"
master_worksheet_name = "001"
student_id_cell = "B2"
mark_cells = ["C6", "C7", "C8"]
master_columns = ["I", "J", "K"]

[processing]
max_concurrent_files = 5
backup_enabled = true
skip_invalid_files = false
timeout_seconds = 120
retry_attempts = 2

[logging]
level = "debug"
"#;

    fn sample_with(from: &str, to: &str) -> Result<Config, ConfigError> {
        Config::from_toml_str(&SAMPLE.replace(from, to))
    }

    #[test]
    fn parses_sample_with_defaults() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.excel.master_id_column, "B");
        assert_eq!(config.excel.mark_cells.len(), 3);
        assert_eq!(config.processing.max_concurrent_files, 5);
        assert_eq!(config.processing.retry_backoff_ms, 1000);
        assert!(!config.processing.skip_invalid_files);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn processing_and_logging_sections_are_optional() {
        let minimal = SAMPLE
            .split("[processing]")
            .next()
            .unwrap()
            .to_string();
        let config = Config::from_toml_str(&minimal).unwrap();
        assert_eq!(config.processing, ProcessingConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn rejects_mismatched_mapping() {
        let err = sample_with(r#"master_columns = ["I", "J", "K"]"#, r#"master_columns = ["I", "J"]"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration validation failed: mark_cells and master_columns must have the same length"
        );
    }

    #[test]
    fn rejects_empty_mapping() {
        let config = SAMPLE
            .replace(r#"mark_cells = ["C6", "C7", "C8"]"#, "mark_cells = []")
            .replace(r#"master_columns = ["I", "J", "K"]"#, "master_columns = []");
        let err = Config::from_toml_str(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration validation failed: mark_cells cannot be empty"
        );
    }

    #[test]
    fn rejects_zero_concurrency_and_timeout() {
        assert!(matches!(
            sample_with("max_concurrent_files = 5", "max_concurrent_files = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            sample_with("timeout_seconds = 120", "timeout_seconds = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(matches!(
            sample_with(r#"student_id_cell = "B2""#, r#"student_id_cell = "2B""#),
            Err(ConfigError::Address {
                field: "student_id_cell",
                ..
            })
        ));
        assert!(matches!(
            sample_with(r#"["I", "J", "K"]"#, r#"["I", "J", "K9"]"#),
            Err(ConfigError::Address { .. })
        ));
    }

    #[test]
    fn rejects_id_column_used_as_destination() {
        let err = sample_with(r#"master_columns = ["I", "J", "K"]"#, r#"master_columns = ["I", "B", "K"]"#)
            .unwrap_err();
        assert!(err.to_string().contains("master_id_column B"));
    }

    #[test]
    fn rejects_non_xlsx_master_and_empty_paths() {
        assert!(matches!(
            sample_with("./master.xlsx", "./master.xls"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            sample_with(r#"output_folder = "./output""#, r#"output_folder = """#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(matches!(
            sample_with(r#"level = "debug""#, r#"level = "loud""#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_resolves_paths_and_reports_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.paths.student_files_folder.is_absolute());
        assert!(config.paths.master_sheet_path.is_absolute());
        assert!(config.paths.backup_folder.is_absolute());

        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[paths\nbroken").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn ensure_directories_creates_output_and_backup() {
        let dir = tempdir().unwrap();
        let mut config = Config::from_toml_str(SAMPLE).unwrap();
        config.paths.output_folder = dir.path().join("out");
        config.paths.backup_folder = dir.path().join("nested").join("backups");

        config.ensure_directories().unwrap();
        assert!(config.paths.output_folder.is_dir());
        assert!(config.paths.backup_folder.is_dir());
    }

    #[test]
    fn run_settings_carry_typed_values() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let settings = config.run_settings().unwrap();

        assert_eq!(settings.extraction.id_cell.to_string(), "B2");
        assert_eq!(settings.extraction.mapping.len(), 3);
        assert_eq!(settings.master_id_column.as_str(), "B");
        assert_eq!(settings.timeout, Duration::from_secs(120));
        assert_eq!(settings.retry.max_attempts(), 2);
        assert_eq!(settings.retry.delay_after(1), Duration::from_secs(1));
        assert!(!settings.skip_invalid_files);
    }
}
