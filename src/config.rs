//! Settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/hierarchy/hierarchy.toml`
//! 3. Explicit config file passed to [`Settings::load`]
//! 4. Environment variables: `HIERARCHY_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};

/// Limits applied while assembling hierarchies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BuilderSettings {
    /// Maximum number of levels a built tree may have, unlimited when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

/// Options for drawing trees as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Levels to draw below the starting node, everything when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Label drawn for a tree without nodes
    pub empty_label: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_depth: None,
            empty_label: "Empty tree".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub builder: BuilderSettings,
    pub render: RenderSettings,
}

/// Raw settings for intermediate parsing; None means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    builder: RawBuilderSettings,
    render: RawRenderSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBuilderSettings {
    max_depth: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    max_depth: Option<usize>,
    empty_label: Option<String>,
}

/// Get the XDG config directory for hierarchy.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hierarchy").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("hierarchy.toml"))
}

fn load_raw_settings(path: &Path) -> TreeResult<RawSettings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| TreeError::Config(format!("read {}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| TreeError::Config(format!("parse {}: {}", path.display(), e)))
}

impl Settings {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> TreeResult<Self> {
        let raw: RawSettings =
            toml::from_str(content).map_err(|e| TreeError::Config(format!("parse: {}", e)))?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            builder: BuilderSettings {
                max_depth: overlay.builder.max_depth.or(self.builder.max_depth),
            },
            render: RenderSettings {
                max_depth: overlay.render.max_depth.or(self.render.max_depth),
                empty_label: overlay
                    .render
                    .empty_label
                    .clone()
                    .unwrap_or_else(|| self.render.empty_label.clone()),
            },
        }
    }

    /// Load settings with layered precedence, see the module docs.
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> TreeResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            debug!(path = %path.display(), "loading config file");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply HIERARCHY_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("HIERARCHY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("builder.max_depth") {
            settings.builder.max_depth = Some(val);
        }
        if let Ok(val) = config.get::<usize>("render.max_depth") {
            settings.render.max_depth = Some(val);
        }
        if let Ok(val) = config.get_string("render.empty_label") {
            settings.render.empty_label = val;
        }

        Ok(settings)
    }

    pub fn to_toml(&self) -> TreeResult<String> {
        toml::to_string_pretty(self).map_err(|e| TreeError::Config(format!("serialize: {}", e)))
    }
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config(e.to_string())
}
