pub mod blueprint;
pub mod error;

pub use blueprint::{ApplicationSpec, Blueprint, LOCATION_ENV_VARS};
pub use error::*;

use std::path::PathBuf;

/// Environment variable naming the blueprint file directly
pub const CONFIG_PATH_ENV: &str = "CFPAAS_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["cfpaas.local.yaml", "cfpaas.yaml"];

/// Find the blueprint file
///
/// Search order:
/// 1. `CFPAAS_CONFIG_PATH`
/// 2. current directory: cfpaas.local.yaml, cfpaas.yaml
/// 3. ./.cfpaas/ with the same names
/// 4. ~/.config/cfpaas/cfpaas.yaml
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!("{} points at missing {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for dir in [current_dir.clone(), current_dir.join(".cfpaas")] {
        for filename in &CANDIDATES {
            let path = dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("cfpaas").join("cfpaas.yaml");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Discover and load the blueprint
pub fn load_blueprint() -> Result<(Blueprint, PathBuf)> {
    let path = find_config_file()?;
    let blueprint = Blueprint::load(&path)?;
    Ok((blueprint, path))
}
