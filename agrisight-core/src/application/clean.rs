// agrisight-core/src/application/clean.rs

use crate::error::AgrisightError;
use crate::infrastructure::config::load_or_default;
use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::path::{Component, Path};

/// Removes the configured `clean-targets`. Returns the targets actually removed.
pub fn clean_project(project_dir: &Path) -> Result<Vec<String>, AgrisightError> {
    tracing::info!("🧹 Initializing Agrisight cleanup sequence...");

    let config = load_or_default(project_dir)?;

    let targets = if config.clean_targets.is_empty() {
        vec![config.target_path.clone()]
    } else {
        config.clean_targets
    };

    let mut removed = Vec::new();
    for target_rel_path in targets {
        // Only plain relative paths below the project root.
        let rel = Path::new(&target_rel_path);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        let full_path = project_dir.join(rel);
        if escapes || rel.as_os_str().is_empty() || !full_path.starts_with(project_dir) {
            return Err(AgrisightError::UnsafePath(target_rel_path));
        }

        if full_path.exists() {
            if full_path.is_dir() {
                fs::remove_dir_all(&full_path)
                    .map_err(|e| AgrisightError::Infrastructure(InfrastructureError::Io(e)))?;
            } else {
                fs::remove_file(&full_path)
                    .map_err(|e| AgrisightError::Infrastructure(InfrastructureError::Io(e)))?;
            }
            println!("   🗑️  Artifact removed: {}", target_rel_path);
            removed.push(target_rel_path);
        }
    }

    Ok(removed)
}
