//! Run settings loading from YAML files
//!
//! Settings can be assembled from command-line flags or read from a YAML
//! file; both paths end in `validate()` before a run starts.

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerationSettings {
    /// Root directory scanned for schema files
    #[serde(default)]
    pub proto_dir: PathBuf,
    /// Directory handed to the emitter
    #[serde(default)]
    pub out_dir: PathBuf,
    /// Extra directories searched for imports not found under `proto_dir`
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
}

impl GenerationSettings {
    pub fn new(proto_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            proto_dir: proto_dir.into(),
            out_dir: out_dir.into(),
            include_dirs: Vec::new(),
        }
    }

    /// Load settings from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::InvalidSettings(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reject empty directories before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.out_dir.as_os_str().is_empty() {
            return Err(GeneratorError::InvalidSettings(
                "Target directory path for generated source cannot be empty!".to_string(),
            ));
        }

        if self.proto_dir.as_os_str().is_empty() {
            return Err(GeneratorError::InvalidSettings(
                "Proto files directory path cannot be empty!".to_string(),
            ));
        }

        Ok(())
    }
}
