// agrisight-core/src/infrastructure/config/project.rs

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::error::DomainError;
use crate::domain::generator::GeneratorConfig;
use crate::domain::project::configuration::ProjectConfig;
use crate::domain::quality::QualityConfig;
use crate::error::AgrisightError;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["agrisight_project_conf.yaml", "agrisight.yaml"];

pub const ENV_TARGET_PATH: &str = "AGRISIGHT_TARGET_PATH";
pub const ENV_SEED: &str = "AGRISIGHT_SEED";

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, AgrisightError> {
    let mut config = read_main_config(project_dir)?;
    hydrate(&mut config, project_dir)?;
    Ok(config)
}

/// Same as [`load_project_config`], but a project without a config file runs
/// on defaults.
pub fn load_or_default(project_dir: &Path) -> Result<ProjectConfig, AgrisightError> {
    let mut config = match read_main_config(project_dir) {
        Err(InfrastructureError::ConfigNotFound(msg)) => {
            info!(%msg, "No project file, using defaults");
            ProjectConfig::default()
        }
        other => other?,
    };
    hydrate(&mut config, project_dir)?;
    Ok(config)
}

fn read_main_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read project config at {:?}", config_path))?;
    let config: ProjectConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse project config YAML at {:?}", config_path))?;
    Ok(config)
}

fn hydrate(config: &mut ProjectConfig, project_dir: &Path) -> Result<(), AgrisightError> {
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            load_satellite_configs(config, &config_dir)?;
        }
    }
    apply_env_overrides(config, |key| std::env::var(key).ok())?;
    Ok(())
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

/// Loads a typed configuration fragment; `T` is the wrapper the file is expected to hold.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config fragment at {:?}", path))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML fragment at {:?}", path))
        .map_err(Into::into)
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    let gen_path = config_dir.join("generator.yml");
    if gen_path.exists() {
        #[derive(Deserialize)]
        struct GeneratorWrapper {
            generator: GeneratorConfig,
        }

        // A corrupt fragment stops the load.
        let wrapper: GeneratorWrapper = load_fragment(&gen_path)?;
        config.generator = wrapper.generator;
        info!("  🎲 Generator settings loaded");
    }

    let qual_path = config_dir.join("quality.yml");
    if qual_path.exists() {
        #[derive(Deserialize)]
        struct QualityWrapper {
            quality: QualityConfig,
        }

        let wrapper: QualityWrapper = load_fragment(&qual_path)?;
        config.quality = wrapper.quality;
        info!("  ✅ Quality rules loaded");
    }

    Ok(())
}

fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F) -> Result<(), DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_TARGET_PATH) {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Some(val) = lookup(ENV_SEED) {
        let seed = val.trim().parse::<u64>().map_err(|_| {
            DomainError::ConfigurationError(format!(
                "{} must be an unsigned integer, got '{}'",
                ENV_SEED, val
            ))
        })?;
        info!(old = config.generator.seed, new = seed, "Overriding generator seed via ENV");
        config.generator.seed = seed;
    }
    Ok(())
}
