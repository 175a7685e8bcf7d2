use crate::error::{AsymError, AsymResult};
use crate::records::RecordFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Names of the fixed directories and files the analysis pipeline writes.
///
/// The defaults reproduce the pipeline's own layout; override them only when
/// reading output from a renamed module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Per-configuration partial-wave output directory.
    pub results_dir: String,
    /// Result file inside `results_dir`; its presence marks a ConfigBin.
    pub results_file: String,
    /// Per-configuration directory holding one file per injection trial.
    pub injection_dir: String,
    /// Shared reference collection at the project root.
    pub reference_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            results_dir: "module-out___asymmetryPW".to_string(),
            results_file: "asymmetry_results.yaml".to_string(),
            injection_dir: "module-out___asymmetryInjectionPW".to_string(),
            reference_file: "asymmetry_results.yaml".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Loads overrides from a JSON or YAML file. Missing keys keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> AsymResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let config: Self = match RecordFormat::from_path(path) {
            RecordFormat::Json => serde_json::from_str(&content)?,
            RecordFormat::Yaml => serde_yaml::from_str(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AsymResult<()> {
        let fields = [
            ("results_dir", &self.results_dir),
            ("results_file", &self.results_file),
            ("injection_dir", &self.injection_dir),
            ("reference_file", &self.reference_file),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AsymError::Config(format!("'{}' must not be empty", name)));
            }
            if value.contains('/') || value.contains('\\') {
                return Err(AsymError::Config(format!(
                    "'{}' must be a single path component, got '{}'",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
