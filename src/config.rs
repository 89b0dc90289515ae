//! Dashboard and loader configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "STARTUP_BENCHMARK_CONFIG";
/// Environment variable overriding [`LoaderConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "STARTUP_BENCHMARK_DATA_DIR";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "startup-benchmark.json";

/// Which source the loader tries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePreference {
    /// Only the files on disk; uploads are ignored.
    Disk,
    /// A complete pair of uploads wins over the files on disk.
    Upload,
}

/// What happens when an expected disk file is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// Write the embedded sample to the missing path and load it.
    Sample,
    /// Report [`LoadError::MissingFile`].
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory holding both data files.
    pub data_dir: PathBuf,
    /// Company profiles file name, relative to `data_dir`.
    pub companies_file: String,
    /// Funding rounds file name, relative to `data_dir`.
    pub rounds_file: String,
    pub preferred: SourcePreference,
    pub fallback: Fallback,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            companies_file: "startups_clean.csv".to_string(),
            rounds_file: "rounds.csv".to_string(),
            preferred: SourcePreference::Upload,
            fallback: Fallback::Sample,
        }
    }
}

impl LoaderConfig {
    /// Uploads preferred, sample data for anything missing on disk.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Disk only, no sample fallback.
    pub fn strict(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            preferred: SourcePreference::Disk,
            fallback: Fallback::Fail,
            ..Self::default()
        }
    }

    pub fn companies_path(&self) -> PathBuf {
        self.data_dir.join(&self.companies_file)
    }

    pub fn rounds_path(&self) -> PathBuf {
        self.data_dir.join(&self.rounds_file)
    }
}

/// Top-level configuration for the desktop dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub caption: String,
    pub source_note: String,
    pub loader: LoaderConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "LATAM Startup Benchmark: Interactive Dashboard".to_string(),
            caption: "Comparative analysis of LATAM startups (2019-2024).".to_string(),
            source_note: "Source: Crunchbase / Dealroom / AngelList, simulated sample data."
                .to_string(),
            loader: LoaderConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration from the environment.
    ///
    /// Reads the file named by `STARTUP_BENCHMARK_CONFIG`, else
    /// `startup-benchmark.json` in the working directory if it exists, else
    /// uses defaults. `STARTUP_BENCHMARK_DATA_DIR` overrides the data directory
    /// in every case.
    pub fn from_env() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.loader.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Parse a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let config = serde_json::from_str(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{ "loader": { "data_dir": "/srv/bench", "fallback": "fail" } }"#,
        )
        .unwrap();
        assert_eq!(config.loader.data_dir, PathBuf::from("/srv/bench"));
        assert_eq!(config.loader.fallback, Fallback::Fail);
        assert_eq!(config.loader.preferred, SourcePreference::Upload);
        assert_eq!(config.loader.rounds_file, "rounds.csv");
        assert_eq!(config.title, DashboardConfig::default().title);
    }

    #[test]
    fn strict_preset_is_disk_only() {
        let config = LoaderConfig::strict("input");
        assert_eq!(config.preferred, SourcePreference::Disk);
        assert_eq!(config.fallback, Fallback::Fail);
        assert_eq!(config.companies_path(), PathBuf::from("input/startups_clean.csv"));
    }
}
