//! Loading and merging of the global and repository-local config files.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::value::ConfigValue;
use crate::error::ConfigError;

/// Environment variable pointing at an alternative global config file.
pub const CONFIG_ENV_VAR: &str = "COMMITSMITH_CONFIG";

/// File name of the repository-local config, relative to the work tree root.
pub const LOCAL_CONFIG_FILE: &str = ".commitsmith.yaml";

/// Locations of the two config documents for one hook run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub global: PathBuf,
    pub local: PathBuf,
}

impl ConfigPaths {
    /// Resolve the default locations for a repository rooted at `work_dir`.
    pub fn resolve(work_dir: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            global: global_config_path().ok_or(ConfigError::NoConfigDir)?,
            local: work_dir.join(LOCAL_CONFIG_FILE),
        })
    }
}

/// Returns the global config path.
///
/// `$COMMITSMITH_CONFIG` wins when set and non-blank, then
/// `$XDG_CONFIG_HOME/commitsmith/config.yaml`, then
/// `~/.config/commitsmith/config.yaml`.
pub fn global_config_path() -> Option<PathBuf> {
    if let Some(path) = non_blank_env(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    let base = match non_blank_env("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()?.join(".config"),
    };
    Some(base.join("commitsmith").join("config.yaml"))
}

fn non_blank_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The merged configuration used for one hook run.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    root: ConfigValue,
}

impl EffectiveConfig {
    /// Build a config from an already-parsed root mapping.
    pub fn from_value(root: ConfigValue) -> Self {
        Self { root }
    }

    /// Parse a single YAML document into a config.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        parse_document(text, path).map(Self::from_value)
    }

    /// The merged root mapping.
    pub fn root(&self) -> &ConfigValue {
        &self.root
    }

    /// Look up a dotted key such as `backend.command`.
    ///
    /// Returns `None` when any segment is missing, when an intermediate
    /// value is not a mapping, or when the final value is explicitly null.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        let mut current = &self.root;
        for segment in key.split('.') {
            current = current.as_map()?.get(segment)?;
        }
        if current.is_null() { None } else { Some(current) }
    }

    /// Look up a dotted key, falling back to `default` when absent or null.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a ConfigValue) -> &'a ConfigValue {
        self.get(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(ConfigValue::Bool(b)) => Ok(*b),
            Some(_) => Err(mismatch(key, "a boolean")),
        }
    }

    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(ConfigValue::Int(i)) => {
                usize::try_from(*i).map_err(|_| mismatch(key, "a non-negative integer"))
            }
            Some(_) => Err(mismatch(key, "a non-negative integer")),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(ConfigValue::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(mismatch(key, "a string")),
        }
    }

    /// Read a list of strings. Absent or null yields an empty list.
    pub fn get_str_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(ConfigValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    ConfigValue::String(s) => Ok(s.clone()),
                    _ => Err(mismatch(key, "a list of strings")),
                })
                .collect(),
            Some(_) => Err(mismatch(key, "a list of strings")),
        }
    }
}

fn mismatch(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

/// Load the effective configuration.
///
/// The global file must exist and parse. The local file is optional; if it
/// exists but cannot be read or parsed, a warning is logged and the global
/// configuration is used alone.
pub fn load(paths: &ConfigPaths) -> Result<EffectiveConfig, ConfigError> {
    let global_text = match fs::read_to_string(&paths.global) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::Missing(paths.global.clone()));
        }
        Err(e) => {
            return Err(ConfigError::Read {
                path: paths.global.clone(),
                source: e,
            });
        }
    };
    let mut root = parse_document(&global_text, &paths.global)?;
    debug!("Loaded global config from {}", paths.global.display());

    match read_local(&paths.local) {
        Ok(Some(local)) => {
            deep_merge(&mut root, local);
            debug!("Merged local config from {}", paths.local.display());
        }
        Ok(None) => {}
        Err(e) => warn!("Ignoring local config: {e}"),
    }

    Ok(EffectiveConfig::from_value(root))
}

fn read_local(path: &Path) -> Result<Option<ConfigValue>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    parse_document(&text, path).map(Some)
}

/// Parse one YAML document. Empty documents are empty mappings.
fn parse_document(text: &str, path: &Path) -> Result<ConfigValue, ConfigError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match ConfigValue::from(yaml) {
        ConfigValue::Null => Ok(ConfigValue::empty_map()),
        value @ ConfigValue::Map(_) => Ok(value),
        other => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            reason: format!("top level must be a mapping, found {}", other.kind()),
        }),
    }
}

/// Merge `overlay` into `base`, overlay winning key for key.
///
/// Mappings merge recursively; every other value (scalars, lists, null)
/// replaces the base value outright.
pub fn deep_merge(base: &mut ConfigValue, overlay: ConfigValue) {
    match (base, overlay) {
        (ConfigValue::Map(base_map), ConfigValue::Map(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}
