use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IntegratorError, Result};

/// Runtime configuration: dataset locations and audit settings.
///
/// All paths default to the `data/processed` working-directory convention;
/// a `config.toml` next to the binary overrides them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: DataPaths,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// Canonical station master (with station codes and coordinates)
    pub master: PathBuf,
    /// Rental price table keyed by operator/line/station text
    pub rent: PathBuf,
    /// Integrated output dataset
    pub integrated: PathBuf,
    /// CSV extract of unmatched rent records for manual inspection
    pub unmatched_extract: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// How many top unmatched operators/lines to list in reports
    pub top_n: usize,
    /// Station names known to be duplicated across distant regions
    pub homonym_watchlist: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: DataPaths::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            master: PathBuf::from("data/processed/stationcode.json"),
            rent: PathBuf::from("data/processed/rent_marketprice.json"),
            integrated: PathBuf::from("data/processed/rent_market_price_integrated.json"),
            unmatched_extract: PathBuf::from("data/processed/unmatched_rent_analysis.csv"),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            homonym_watchlist: crate::pipeline::processing::audit::DEFAULT_HOMONYM_WATCHLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            IntegratorError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Loads `config.toml` from the working directory if present, otherwise
    /// falls back to defaults.
    pub fn load_or_default() -> Result<Self> {
        let path = Path::new("config.toml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_follow_working_directory_convention() {
        let config = Config::default();
        assert_eq!(
            config.paths.master,
            PathBuf::from("data/processed/stationcode.json")
        );
        assert_eq!(
            config.paths.rent,
            PathBuf::from("data/processed/rent_marketprice.json")
        );
        assert_eq!(config.audit.top_n, 10);
        assert!(config.audit.homonym_watchlist.contains(&"福島".to_string()));
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_sections() {
        let parsed: Config = toml::from_str(
            r#"
            [audit]
            top_n = 5
            "#,
        )
        .unwrap();
        assert_eq!(parsed.audit.top_n, 5);
        assert_eq!(
            parsed.paths.integrated,
            PathBuf::from("data/processed/rent_market_price_integrated.json")
        );
    }
}
