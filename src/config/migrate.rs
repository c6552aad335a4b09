//! Configuration file upgrades: add keys introduced by newer versions,
//! keeping every value the user already set.

use super::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Keys present in the default configuration but missing from `content`.
pub fn missing_keys(content: &str) -> AppResult<Vec<String>> {
    let current = parse_mapping(content)?;
    let defaults = default_mapping()?;

    Ok(defaults
        .keys()
        .filter(|k| !current.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

/// Return `content` with every missing key filled from the defaults.
pub fn upgrade_yaml(content: &str) -> AppResult<(String, Vec<String>)> {
    let mut current = parse_mapping(content)?;
    let defaults = default_mapping()?;
    let mut added = Vec::new();

    for (k, v) in defaults {
        if !current.contains_key(&k) {
            if let Some(name) = k.as_str() {
                added.push(name.to_string());
            }
            current.insert(k, v);
        }
    }

    let out = serde_yaml::to_string(&Value::Mapping(current))
        .map_err(|e| AppError::Config(e.to_string()))?;
    Ok((out, added))
}

/// Upgrade the config file on disk. Returns `true` when the file changed.
pub fn run_config_migration(path: &Path) -> AppResult<bool> {
    if !path.exists() {
        info(format!("No configuration file at {}", path.display()));
        return Ok(false);
    }

    let content = fs::read_to_string(path)?;
    let (upgraded, added) = upgrade_yaml(&content)?;

    if added.is_empty() {
        info("Configuration file is up to date.");
        return Ok(false);
    }

    fs::write(path, upgraded)?;
    success(format!("Configuration upgraded, added: {}", added.join(", ")));
    Ok(true)
}

fn parse_mapping(content: &str) -> AppResult<Mapping> {
    let value: Value =
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))?;
    match value {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(
            "configuration file is not a YAML mapping".into(),
        )),
    }
}

fn default_mapping() -> AppResult<Mapping> {
    let yaml = Config::default().to_yaml()?;
    parse_mapping(&yaml)
}
