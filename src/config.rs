//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/nodetree/nodetree.toml`
//! 3. Local config: a file named explicitly by the caller
//! 4. Environment variables: `NODETREE_*` prefix

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};

/// Which linkage strategy backs a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Doubly-linked sibling chains: O(1) splices
    #[default]
    Linked,
    /// Per-container child arrays: O(1) index lookup
    Indexed,
}

/// Effective settings for building trees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Backend used when the caller does not pick one
    pub backend: Backend,
    /// Arena slots reserved up front
    pub capacity: usize,
    /// Reject insertions that would make a node its own ancestor
    pub check_cycles: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::Linked,
            capacity: 64,
            check_cycles: true,
        }
    }
}

/// Raw settings for intermediate parsing; `None` means "not specified".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub backend: Option<Backend>,
    pub capacity: Option<usize>,
    pub check_cycles: Option<bool>,
}

/// Get the XDG config directory for nodetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "nodetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("nodetree.toml"))
}

fn load_raw_settings(path: &Path) -> TreeResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| TreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}

/// An unset variable is `None`; one that is set but does not parse is an error.
fn env_value<V>(found: Result<V, ConfigError>, name: &str) -> TreeResult<Option<V>> {
    match found {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(TreeError::Config {
            message: format!("{}: {}", name, e),
        }),
    }
}

impl Settings {
    /// Overlay values win where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            backend: overlay.backend.unwrap_or(self.backend),
            capacity: overlay.capacity.unwrap_or(self.capacity),
            check_cycles: overlay.check_cycles.unwrap_or(self.check_cycles),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// A missing global file is skipped; a `local` file that cannot be read
    /// or parsed is an error.
    #[instrument(level = "debug")]
    pub fn load(local: Option<&Path>) -> TreeResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "applying global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(local_path) = local {
            debug!(path = %local_path.display(), "applying local config");
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Defaults overlaid with a single file; ignores global config and env.
    pub fn from_file(path: &Path) -> TreeResult<Self> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply NODETREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("NODETREE").prefix_separator("_"))
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(config.get_string("backend"), "NODETREE_BACKEND")? {
            settings.backend = Backend::from_str(&val, true).map_err(|e| TreeError::Config {
                message: format!("NODETREE_BACKEND: {}", e),
            })?;
        }
        if let Some(val) = env_value(config.get_int("capacity"), "NODETREE_CAPACITY")? {
            settings.capacity = usize::try_from(val).map_err(|e| TreeError::Config {
                message: format!("NODETREE_CAPACITY: {}", e),
            })?;
        }
        if let Some(val) = env_value(config.get_bool("check_cycles"), "NODETREE_CHECK_CYCLES")? {
            settings.check_cycles = val;
        }

        Ok(settings)
    }

    /// Render as TOML, in the format `load` reads back.
    pub fn to_toml(&self) -> TreeResult<String> {
        toml::to_string_pretty(self).map_err(|e| TreeError::Config {
            message: e.to_string(),
        })
    }
}
