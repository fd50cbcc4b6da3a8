//! Configuration management for mdscript.
//!
//! Parses `mdscript.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [render]
//! unsafe = false
//! debug = false
//! hard_wraps = false
//!
//! [script]
//! container = "mdDiv"
//! entry_point = "render"
//! style_object = "mdStyle"
//! ```
//!
//! Command-line flags can be applied during load via [`Overrides`].

use std::path::{Path, PathBuf};

use mdscript_renderer::{OptionsError, RenderOptions};
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdscript.toml";

/// Settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Override unsafe mode.
    pub unsafe_html: Option<bool>,
    /// Override debug comments.
    pub debug: Option<bool>,
    /// Override soft break handling.
    pub hard_wraps: Option<bool>,
    /// Override the style object name.
    pub style_object: Option<String>,
}

/// Renderer configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering behavior.
    pub render: RenderSection,
    /// Names used in the generated script.
    pub script: ScriptSection,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[render]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    /// Disable the URL guard and emit raw HTML.
    #[serde(rename = "unsafe")]
    pub unsafe_html: bool,
    /// Emit a comment before every attachment.
    pub debug: bool,
    /// Render soft line breaks as `br` elements.
    pub hard_wraps: bool,
}

/// `[script]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScriptSection {
    /// Root container variable.
    pub container: String,
    /// Generated function name.
    pub entry_point: String,
    /// Style object whose entries are assigned to created elements.
    pub style_object: Option<String>,
}

impl Default for ScriptSection {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            container: options.container,
            entry_point: options.entry_point,
            style_object: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(#[from] OptionsError),
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdscript.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&Overrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` or `ConfigError::Validation`.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides to the configuration.
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(unsafe_html) = overrides.unsafe_html {
            self.render.unsafe_html = unsafe_html;
        }
        if let Some(debug) = overrides.debug {
            self.render.debug = debug;
        }
        if let Some(hard_wraps) = overrides.hard_wraps {
            self.render.hard_wraps = hard_wraps;
        }
        if let Some(style_object) = &overrides.style_object {
            self.script.style_object = Some(style_object.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_from(&cwd)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after parsing. The `[script]` names are checked
    /// by the renderer's own option validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render_options().validate()?;
        Ok(())
    }

    /// Renderer options described by this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            unsafe_html: self.render.unsafe_html,
            debug: self.render.debug,
            hard_wraps: self.render.hard_wraps,
            style_object: self.script.style_object.clone(),
            container: self.script.container.clone(),
            entry_point: self.script.entry_point.clone(),
        }
    }
}
