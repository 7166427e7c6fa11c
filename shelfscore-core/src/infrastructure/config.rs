// shelfscore-core/src/infrastructure/config.rs
//
// Threshold configuration loading: optional YAML file, then environment
// overrides. CLI flags are layered on top by the caller.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::domain::config::ScoringConfig;
use crate::error::ShelfscoreError;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["shelfscore.yaml", "shelfscore.yml"];

fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

fn load_file(path: &Path) -> Result<ScoringConfig, InfrastructureError> {
    let content = std::fs::read_to_string(path)?;
    let config: ScoringConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut ScoringConfig) {
    if let Ok(val) = std::env::var("SHELFSCORE_TARGET_SUPPLIER") {
        info!(old = %config.target_supplier, new = %val, "Overriding target supplier via ENV");
        config.target_supplier = val;
    }
}

/// Resolves the scoring configuration: an explicit file if given, else a
/// `shelfscore.yaml` next to the working directory, else defaults. The
/// result is range-validated before use.
#[instrument(skip_all)]
pub fn load_scoring_config(explicit: Option<&Path>) -> Result<ScoringConfig, ShelfscoreError> {
    let mut config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(
                    InfrastructureError::ConfigNotFound(path.display().to_string()).into(),
                );
            }
            info!(path = %path.display(), "Loading scoring configuration");
            load_file(path)?
        }
        None => match find_config(Path::new(".")) {
            Some(path) => {
                info!(path = %path.display(), "Loading scoring configuration");
                load_file(&path)?
            }
            None => ScoringConfig::default(),
        },
    };

    apply_env_overrides(&mut config);
    config.check()?;
    Ok(config)
}
