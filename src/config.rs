//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/nodelink/nodelink.toml`
//! 3. Project config: `<input_dir>/.nodelink.toml`
//! 4. Environment variables: `NODELINK_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// File name of the per-project config, looked up in the input directory.
pub const PROJECT_CONFIG_FILE: &str = ".nodelink.toml";

/// Unified configuration for nodelink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Entry file name resolved inside the input directory
    pub main_file: String,
    /// Directory name marking package boundaries
    pub registry_dir: String,
    /// Import identifiers excluded from traversal and linking
    pub ignore: Vec<String>,
    /// Extensions probed during resolution, in priority order
    pub extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_file: "index.js".into(),
            registry_dir: "node_modules".into(),
            ignore: vec![],
            extensions: vec![".js".into(), ".json".into(), ".node".into()],
        }
    }
}

/// Raw settings for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub main_file: Option<String>,
    pub registry_dir: Option<String>,
    pub ignore: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
}

/// Get the XDG config directory for nodelink.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "nodelink").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("nodelink.toml"))
}

/// Get the path to the project config file in an input directory.
pub fn project_config_path(input_dir: &Path) -> PathBuf {
    input_dir.join(PROJECT_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        // Convert to sorted Vec for deterministic output
        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - `ignore`: union merge with negation support (if overlay specified)
    /// - `extensions`: REPLACE. The list is an ordered probe sequence, so
    ///   a sorted union would scramble the priority.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            main_file: overlay
                .main_file
                .clone()
                .unwrap_or_else(|| self.main_file.clone()),
            registry_dir: overlay
                .registry_dir
                .clone()
                .unwrap_or_else(|| self.registry_dir.clone()),
            ignore: overlay
                .ignore
                .as_ref()
                .map(|o| Self::merge_array(&self.ignore, o))
                .unwrap_or_else(|| self.ignore.clone()),
            extensions: overlay
                .extensions
                .clone()
                .unwrap_or_else(|| self.extensions.clone()),
        }
    }

    /// Apply global config onto defaults.
    ///
    /// Unlike `merge_with()` which uses union semantics for `ignore`, this
    /// method uses REPLACE semantics: if global config specifies an array,
    /// it completely replaces the default array. Global config defines the
    /// real baseline; project config then adds on top.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            main_file: global
                .main_file
                .clone()
                .unwrap_or_else(|| self.main_file.clone()),
            registry_dir: global
                .registry_dir
                .clone()
                .unwrap_or_else(|| self.registry_dir.clone()),
            ignore: global.ignore.clone().unwrap_or_else(|| self.ignore.clone()),
            extensions: global
                .extensions
                .clone()
                .unwrap_or_else(|| self.extensions.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `input_dir` - Optional input directory for project config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/nodelink/nodelink.toml` (arrays REPLACE defaults)
    /// 3. Project config: `<input_dir>/.nodelink.toml` (`ignore` UNIONS with global)
    /// 4. Environment variables: `NODELINK_*` prefix (REPLACES - explicit override)
    pub fn load(input_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config (REPLACES defaults - global defines the real baseline)
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        // 3. Project config (`ignore` UNIONS with global)
        if let Some(input) = input_dir {
            let local_path = project_config_path(input);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (replaces - explicit override)
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Apply NODELINK_* environment variables as explicit overrides.
    ///
    /// Env vars replace values (not merge) - they are explicit user overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("NODELINK")
                .separator("__")
                .list_separator(","),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("main_file") {
            settings.main_file = val;
        }
        if let Ok(val) = config.get_string("registry_dir") {
            settings.registry_dir = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("ignore") {
            settings.ignore = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("extensions") {
            settings.extensions = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# nodelink configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/nodelink/nodelink.toml  (defines your baseline)
#   Project: <input_dir>/.nodelink.toml        (project-specific additions)
#   Env:     NODELINK_* environment variables  (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Project config UNIONS `ignore` with global. Use "!name" to REMOVE an
#   inherited entry:
#     ignore = ["mockfs", "!electron"]  # adds mockfs, removes electron
#   `extensions` is an ordered probe list and always REPLACES.

# Entry file resolved inside the input directory
# main_file = "index.js"

# Directory name marking package boundaries
# registry_dir = "node_modules"

# Import identifiers excluded from traversal and linking
# ignore = ["electron"]

# Extensions probed during resolution, in priority order
# extensions = [".js", ".json", ".node"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
