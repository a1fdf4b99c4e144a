use crate::errors::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_LEDGER_FILE: &str = "evaluations.csv";
pub const DEFAULT_SUMMARY_FILE: &str = "summary.csv";
const WRITE_SUBDIR: &str = "odsc-eval";

/// Where the ledger and summary live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub write_dir: PathBuf,
    pub ledger_file: String,
    pub summary_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let tmp = env::var_os("TMPDIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        Self {
            write_dir: tmp.join(WRITE_SUBDIR),
            ledger_file: DEFAULT_LEDGER_FILE.to_string(),
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn in_dir(write_dir: impl Into<PathBuf>) -> Self {
        Self {
            write_dir: write_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    /// Overrides fields from `ODSC_WRITE_DIR`, `ODSC_LEDGER_FILE`, `ODSC_SUMMARY_FILE`.
    pub fn apply_env(&mut self) {
        if let Ok(v) = env::var("ODSC_WRITE_DIR") {
            if !v.trim().is_empty() {
                self.write_dir = PathBuf::from(v);
            }
        }
        if let Ok(v) = env::var("ODSC_LEDGER_FILE") {
            if !v.trim().is_empty() {
                self.ledger_file = v;
            }
        }
        if let Ok(v) = env::var("ODSC_SUMMARY_FILE") {
            if !v.trim().is_empty() {
                self.summary_file = v;
            }
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.write_dir.join(&self.ledger_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.write_dir.join(&self.summary_file)
    }

    pub fn validate(&self) -> EvalResult<()> {
        check_file_name("ledger_file", &self.ledger_file)?;
        check_file_name("summary_file", &self.summary_file)?;
        if self.ledger_file == self.summary_file {
            return Err(EvalError::Config(format!(
                "ledger_file and summary_file must differ (both '{}')",
                self.ledger_file
            )));
        }
        Ok(())
    }
}

fn check_file_name(field: &str, name: &str) -> EvalResult<()> {
    let plain = !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\');
    if plain {
        Ok(())
    } else {
        Err(EvalError::Config(format!(
            "{field} must be a plain file name, got '{name}'"
        )))
    }
}

/// Loads a YAML storage config, then applies environment overrides.
///
/// Unknown keys fail in strict mode and are logged otherwise.
pub fn load_config(path: &Path, strict: bool) -> EvalResult<StorageConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| EvalError::Config(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);
    let mut cfg: StorageConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.push(p.to_string());
    })
    .map_err(|e| EvalError::Config(format!("failed to parse YAML {}: {}", path.display(), e)))?;

    if !ignored_keys.is_empty() {
        if strict {
            return Err(EvalError::Config(format!(
                "Unknown fields detected in strict mode: {:?} (file: {})",
                ignored_keys,
                path.display()
            )));
        }
        tracing::warn!(keys = ?ignored_keys, file = %path.display(), "ignored unknown config fields");
    }

    cfg.apply_env();
    cfg.validate()?;
    Ok(cfg)
}
