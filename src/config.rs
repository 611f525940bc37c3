use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Name of the source the dashboard reads.
    pub source: String,

    /// Named sources: name → file path (.csv, .json, .parquet).
    pub sources: BTreeMap<String, PathBuf>,

    /// Binary target column.
    pub target: String,

    /// Rows shown in the sample records table.
    pub sample_rows: usize,

    /// `LIMIT` of the query panel.
    pub query_limit: usize,

    /// Bins per distribution histogram.
    pub histogram_bins: usize,

    /// Fields drawn as outcome-split histograms.
    pub histogram_fields: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let mut sources = BTreeMap::new();
        sources.insert("diabetes_csv".to_string(), PathBuf::from("data/diabetes.csv"));
        Self {
            source: "diabetes_csv".to_string(),
            sources,
            target: "Outcome".to_string(),
            sample_rows: 10,
            query_limit: 10,
            histogram_bins: 30,
            histogram_fields: vec!["Glucose".into(), "BMI".into(), "Age".into()],
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file; missing keys take defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// An explicit path must exist; otherwise `dashboard.toml` is used when
    /// present, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(DEFAULT_CONFIG_FILE)
            }
            None => {
                log::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Point the active source at `path`.
    pub fn override_data_path(&mut self, path: PathBuf) {
        self.sources.insert(self.source.clone(), path);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sources.contains_key(&self.source) {
            bail!("active source '{}' is not listed under [sources]", self.source);
        }
        if self.target.is_empty() {
            bail!("target column must not be empty");
        }
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        Ok(())
    }
}
