//! Run configuration loaded from a TOML file.
//!
//! Configuration problems are the only fatal error class: the coordinator
//! refuses to start on a missing file, a parse failure, or an invalid value,
//! before any source file is touched.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BankflowError, Result};
use crate::models::RuleSet;

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub quarantine_dir: PathBuf,
    pub ledger_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Bounded worker-pool size for per-file tasks.
    pub parallel_workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Upper bound on a single transaction amount. Unset means unbounded.
    pub max_transaction_amount: f64,
    /// Currency whitelist; empty disables the currency check.
    pub allowed_currencies: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_transaction_amount: f64::INFINITY,
            allowed_currencies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
        }
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

/// The full run configuration. Loaded once per run and injected into the
/// coordinator; never held as ambient global state.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Optional replacement for the built-in category keyword table. When
    /// present it replaces the defaults wholesale (no merging).
    #[serde(default)]
    pub categories: Option<toml::Table>,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BankflowError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| BankflowError::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.processing.parallel_workers < 1 {
            return Err(BankflowError::Config(
                "processing.parallel_workers must be >= 1".to_string(),
            ));
        }
        if !(self.validation.max_transaction_amount > 0.0) {
            return Err(BankflowError::Config(
                "validation.max_transaction_amount must be > 0".to_string(),
            ));
        }
        // Surface a malformed categories table now rather than mid-run.
        if self.categories.is_some() {
            self.keyword_table()?;
        }
        Ok(())
    }

    /// The validator rule set derived from this configuration.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            max_transaction_amount: self.validation.max_transaction_amount,
            allowed_currencies: self
                .validation
                .allowed_currencies
                .iter()
                .map(|c| c.trim().to_uppercase())
                .collect::<HashSet<String>>(),
        }
    }

    /// The configured category keyword table, or `None` when the defaults
    /// apply. Table order in the file is preserved as label priority.
    pub fn keyword_table(&self) -> Result<Option<Vec<(String, Vec<String>)>>> {
        let Some(table) = &self.categories else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(table.len());
        for (label, value) in table {
            let keywords = value
                .as_array()
                .ok_or_else(|| {
                    BankflowError::Config(format!(
                        "categories.{} must be an array of strings",
                        label
                    ))
                })?
                .iter()
                .map(|v| {
                    v.as_str().map(|s| s.to_string()).ok_or_else(|| {
                        BankflowError::Config(format!(
                            "categories.{} must contain only strings",
                            label
                        ))
                    })
                })
                .collect::<Result<Vec<String>>>()?;
            out.push((label.clone(), keywords));
        }
        Ok(Some(out))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
