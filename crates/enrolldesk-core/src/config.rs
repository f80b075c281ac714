//! Application configuration management.
//!
//! This module handles loading and saving the desk configuration: where the
//! workbook lives, how many students fit in a section, and which program
//! letter goes into generated student ids.
//!
//! Configuration is stored at `~/.config/enrolldesk/config.json`.
//! `ENROLLDESK_WORKBOOK` and `ENROLLDESK_CAPACITY` override the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{EnrollmentPolicy, DEFAULT_PROGRAM_CODE, DEFAULT_SECTION_CAPACITY};

/// Application name used for config/data directory paths
const APP_NAME: &str = "enrolldesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_WORKBOOK: &str = "ENROLLDESK_WORKBOOK";
pub const ENV_CAPACITY: &str = "ENROLLDESK_CAPACITY";

fn default_capacity() -> Option<usize> {
    Some(DEFAULT_SECTION_CAPACITY)
}

fn default_program_code() -> char {
    DEFAULT_PROGRAM_CODE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workbook_dir: Option<PathBuf>,
    /// `null` means sections never fill
    #[serde(default = "default_capacity")]
    pub section_capacity: Option<usize>,
    #[serde(default = "default_program_code")]
    pub default_program_code: char,
    /// Student type to program letter
    #[serde(default)]
    pub program_codes: BTreeMap<String, char>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook_dir: None,
            section_capacity: default_capacity(),
            default_program_code: default_program_code(),
            program_codes: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `ENROLLDESK_*` overrides read through `lookup`.
    ///
    /// A capacity of `none` or `unbounded` removes the limit.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_WORKBOOK).filter(|v| !v.trim().is_empty()) {
            self.workbook_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(value) = lookup(ENV_CAPACITY).filter(|v| !v.trim().is_empty()) {
            self.section_capacity = match value.trim().to_ascii_lowercase().as_str() {
                "none" | "unbounded" => None,
                n => Some(
                    n.parse()
                        .with_context(|| format!("{} must be a number, got '{}'", ENV_CAPACITY, value))?,
                ),
            };
        }
        Ok(())
    }

    /// Directory holding the workbook sheets and journal
    pub fn workbook_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.workbook_dir {
            return Ok(dir.clone());
        }
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("workbook"))
    }

    /// Enrollment rules from this config
    pub fn policy(&self) -> Result<EnrollmentPolicy> {
        if !self.default_program_code.is_ascii_alphabetic() {
            bail!(
                "default_program_code must be a letter, got '{}'",
                self.default_program_code
            );
        }

        let mut policy = EnrollmentPolicy {
            default_program_code: self.default_program_code.to_ascii_uppercase(),
            ..EnrollmentPolicy::default()
        }
        .with_capacity(self.section_capacity);

        for (student_type, &code) in &self.program_codes {
            if !code.is_ascii_alphabetic() {
                bail!(
                    "Program code for '{}' must be a letter, got '{}'",
                    student_type,
                    code
                );
            }
            policy = policy.with_program_code(student_type, code);
        }
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.section_capacity, Some(6));
        assert_eq!(config.default_program_code, 'R');
    }

    #[test]
    fn test_null_capacity_is_unbounded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"section_capacity": null}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.section_capacity, None);
        assert_eq!(config.policy().unwrap().capacity, None);
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");

        let mut config = Config {
            workbook_dir: Some(temp.path().join("book")),
            section_capacity: Some(10),
            ..Config::default()
        };
        config.program_codes.insert("Transferee".to_string(), 'T');
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_policy_program_codes() {
        let mut config = Config::default();
        config.program_codes.insert("Transferee".to_string(), 't');

        let policy = config.policy().unwrap();
        assert_eq!(policy.program_code_for("transferee"), 'T');
        assert_eq!(policy.program_code_for("Regular"), 'R');

        config.program_codes.insert("Scholar".to_string(), '7');
        assert!(config.policy().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(|key| match key {
                ENV_WORKBOOK => Some("/srv/book".to_string()),
                ENV_CAPACITY => Some("unbounded".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.workbook_dir().unwrap(), PathBuf::from("/srv/book"));
        assert_eq!(config.section_capacity, None);

        config
            .apply_env(|key| (key == ENV_CAPACITY).then(|| " 12 ".to_string()))
            .unwrap();
        assert_eq!(config.section_capacity, Some(12));

        let err = config
            .apply_env(|key| (key == ENV_CAPACITY).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CAPACITY));
    }
}
