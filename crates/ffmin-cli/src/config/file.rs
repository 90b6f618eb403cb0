use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileForcefieldConfig {
    pub name: Option<String>,
    pub parameters: Option<PathBuf>,
    pub groups: Option<PathBuf>,
    pub terms: Option<Vec<String>>,
    pub electrostatics: Option<bool>,
    pub cutoff: Option<f64>,
    pub trace: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMinimizationConfig {
    pub algorithm: Option<String>,
    pub line_search: Option<String>,
    pub max_steps: Option<usize>,
    pub energy_tolerance: Option<f64>,
    pub update_pairs_frequency: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub forcefield: Option<FileForcefieldConfig>,
    pub minimization: Option<FileMinimizationConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
