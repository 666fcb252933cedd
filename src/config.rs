use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grouping::GroupingMode;
use crate::source::TextEngine;

pub const DEFAULT_INPUT_GLOB: &str = "./input/**/*.pdf";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// How one document is split and named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    pub mode: GroupingMode,
    /// Leading component of flat-mode names, `NOMINA` in `NOMINA_2024-03_12345678A`.
    pub name_prefix: String,
    /// Put every entry under a `<period>/` folder.
    pub period_folder: bool,
    pub text_engine: TextEngine,
    /// Leading component of the suggested archive name, `nominas` in `nominas_2024-03.zip`.
    pub archive_prefix: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            mode: GroupingMode::Flat,
            name_prefix: "NOMINA".to_string(),
            period_folder: false,
            text_engine: TextEngine::Auto,
            archive_prefix: "nominas".to_string(),
        }
    }
}

/// Contents of `nominas.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub split: SplitOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl SplitConfig {
    pub fn input_glob(&self) -> String {
        self.input.clone().unwrap_or_else(|| DEFAULT_INPUT_GLOB.to_string())
    }

    pub fn output_dir(&self) -> String {
        self.output.clone().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
    }
}

fn is_safe_prefix(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Check the options that end up inside file names.
pub fn validate_options(opts: &SplitOptions) -> Result<(), ConfigError> {
    if !is_safe_prefix(&opts.name_prefix) {
        return Err(ConfigError::Invalid(format!("name_prefix {:?} must match [A-Za-z0-9_-]+", opts.name_prefix)));
    }
    if !is_safe_prefix(&opts.archive_prefix) {
        return Err(ConfigError::Invalid(format!(
            "archive_prefix {:?} must match [A-Za-z0-9_-]+",
            opts.archive_prefix
        )));
    }
    Ok(())
}

/// Read and validate a YAML config file.
pub fn load_config(path: &Path) -> Result<SplitConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<SplitConfig, ConfigError> {
    // An empty file deserializes to unit, not a mapping.
    if raw.trim().is_empty() {
        return Ok(SplitConfig::default());
    }
    let cfg: SplitConfig = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
    if matches!(cfg.input.as_deref(), Some(s) if s.trim().is_empty()) {
        return Err(ConfigError::Invalid("input glob is empty".into()));
    }
    if matches!(cfg.output.as_deref(), Some(s) if s.trim().is_empty()) {
        return Err(ConfigError::Invalid("output dir is empty".into()));
    }
    validate_options(&cfg.split)?;
    Ok(cfg)
}
