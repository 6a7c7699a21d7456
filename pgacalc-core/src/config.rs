use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{resource::ResourceLocator, validate::VS30_DEFAULT, weights::SecondarySelection};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// resource_dir = "/opt/pgacalc/res"
/// no_result_text = "CHECK LOGFILE"
/// secondary_selection = "gated"
/// default_vs30 = 760.0
/// log_level = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory searched for `gmm.xml` and the other resource documents.
    pub resource_dir: Option<PathBuf>,

    /// Written to stdout in place of a value when the calculation fails.
    pub no_result_text: Option<String>,

    pub secondary_selection: SecondarySelection,

    /// Vs30 (m/s) used when none is given on the command line.
    pub default_vs30: f64,

    /// Log filter used when `RUST_LOG` is unset, e.g. "warn" or "pgacalc_core=debug".
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_dir: None,
            no_result_text: None,
            secondary_selection: SecondarySelection::default(),
            default_vs30: VS30_DEFAULT,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or return defaults if
    /// it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "pgacalc", "pgacalc")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn resource_locator(&self) -> ResourceLocator {
        ResourceLocator::new(self.resource_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.default_vs30, 760.0);
        assert_eq!(cfg.secondary_selection, SecondarySelection::Fallback);
        assert_eq!(cfg.log_level, "warn");
        assert!(cfg.resource_dir.is_none());
        assert!(cfg.no_result_text.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "secondary_selection = \"gated\"\nno_result_text = \"CHECK LOGFILE\"\n")
            .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.secondary_selection, SecondarySelection::Gated);
        assert_eq!(cfg.no_result_text.as_deref(), Some("CHECK LOGFILE"));
        assert_eq!(cfg.default_vs30, 760.0);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            resource_dir: Some(dir.path().join("res")),
            no_result_text: Some("n/a".into()),
            secondary_selection: SecondarySelection::Gated,
            default_vs30: 400.0,
            log_level: "debug".into(),
        };
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "secondary_selection = \"sometimes\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
