// agrisight-core/src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::generator::GeneratorConfig;
use crate::domain::kpi::KpiConfig;
use crate::domain::quality::QualityConfig;

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,

    #[serde(rename = "config-paths", default = "default_config_paths")]
    pub config_paths: Vec<String>,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    /// Raw survey CSV. When absent, `run` generates a synthetic one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    #[validate(nested)]
    pub quality: QualityConfig,

    #[serde(default)]
    #[validate(nested)]
    pub kpi: KpiConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "agrisight".to_string(),
            version: "0.1.0".to_string(),
            config_paths: default_config_paths(),
            target_path: default_target_path(),
            clean_targets: default_clean_targets(),
            input: None,
            generator: GeneratorConfig::default(),
            quality: QualityConfig::default(),
            kpi: KpiConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Validates every section; the first failure is reported as a configuration error.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::ConfigurationError(e.to_string()))
    }
}

fn default_config_paths() -> Vec<String> {
    vec!["config".to_string()]
}
fn default_clean_targets() -> Vec<String> {
    vec!["target".to_string()]
}
fn default_target_path() -> String {
    "target".to_string()
}
