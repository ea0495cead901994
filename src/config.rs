//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/diagtree/diagtree.toml`
//! 3. Local config: `<data_dir>/.diagtree.toml` (next to the diagnostic data)
//! 4. Environment variables: `DIAGTREE_*` prefix
//! 5. Explicit overrides from the command line

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Locale used when neither config nor environment names one.
pub const FALLBACK_LOCALE: &str = "en";

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub locale: Option<String>,
    pub default_locale: Option<String>,
}

/// Unified configuration for diagtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root of the static data (machines.json, diagnostics/)
    pub data_dir: PathBuf,
    /// Preferred template locale
    pub locale: String,
    /// Locale tried when the preferred variant is missing
    pub default_locale: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            locale: FALLBACK_LOCALE.into(),
            default_locale: FALLBACK_LOCALE.into(),
        }
    }
}

/// Get the default data directory (XDG data dir, or ./data).
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "diagtree")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Get the XDG config directory for diagtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "diagtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("diagtree.toml"))
}

/// Get the path to the local config file in a data directory.
pub fn local_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".diagtree.toml")
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

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Directory holding templates and the parts catalog.
    pub fn diagnostics_dir(&self) -> PathBuf {
        self.data_dir.join("diagnostics")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.diagnostics_dir().join("templates")
    }

    pub fn machines_path(&self) -> PathBuf {
        self.data_dir.join("machines.json")
    }

    pub fn parts_path(&self) -> PathBuf {
        self.diagnostics_dir().join("parts.json")
    }

    /// Locale candidates in fallback order, without duplicates.
    pub fn locale_candidates(&self) -> Vec<String> {
        let mut candidates = Vec::with_capacity(2);
        for locale in [&self.locale, &self.default_locale] {
            let locale = locale.trim();
            if !locale.is_empty() && !candidates.iter().any(|c: &String| c == locale) {
                candidates.push(locale.to_string());
            }
        }
        candidates
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            locale: overlay.locale.clone().unwrap_or_else(|| self.locale.clone()),
            default_locale: overlay
                .default_locale
                .clone()
                .unwrap_or_else(|| self.default_locale.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `data_dir` - Explicit data directory (CLI flag); also decides where
    ///   the local config file is looked up
    ///
    /// The local config cannot relocate the data directory it lives in;
    /// its `data_dir` key is ignored.
    pub fn load(data_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        let env = Self::env_overrides()?;

        // 3. Local config, located via the highest-precedence data_dir
        let effective_dir = data_dir
            .map(Path::to_path_buf)
            .or_else(|| env.data_dir.clone())
            .unwrap_or_else(|| current.data_dir.clone());
        let local_path = local_config_path(&expand_path(&effective_dir));
        if local_path.exists() {
            let mut raw = load_raw_settings(&local_path)?;
            raw.data_dir = None;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = current.merge_with(&env);

        // 5. Explicit override
        if let Some(dir) = data_dir {
            current.data_dir = dir.to_path_buf();
        }

        current.data_dir = expand_path(&current.data_dir);
        Ok(current)
    }

    /// Read DIAGTREE_* environment variables.
    fn env_overrides() -> Result<RawSettings, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("DIAGTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        Ok(RawSettings {
            data_dir: config.get_string("data_dir").ok().map(PathBuf::from),
            locale: config.get_string("locale").ok(),
            default_locale: config.get_string("default_locale").ok(),
        })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# diagtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/diagtree/diagtree.toml
#   Local:  <data_dir>/.diagtree.toml
#   Env:    DIAGTREE_* environment variables
#   Flags:  --data-dir, --locale

# Directory containing machines.json and diagnostics/
# data_dir = "~/.local/share/diagtree"

# Preferred template locale; falls back to default_locale
# locale = "es"
# default_locale = "en"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
