pub mod styles;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use styles::{FontStretch, FontStyle, FontWeight, Preset, StyleSet, DEFAULT_STYLE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Style name \"{0}\" is reserved for the built-in default")]
    ReservedStyleName(String),

    #[error("Style \"{0}\" does not exist")]
    UnknownStyle(String),

    #[error("Style \"{0}\" already exists")]
    DuplicateStyle(String),

    #[error("Font size {0} is outside the supported range 10..=30")]
    FontSizeOutOfRange(f32),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Location of the user-editable style preset file.
    pub styles_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            styles_path: Self::config_dir().join("styles.toml"),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.styles_path = expand_path(&config.styles_path).unwrap_or(config.styles_path);

        Ok(Some(config))
    }

    /// Loads the user config, falling back to defaults when none has been saved yet.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(Self::config_path())?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn config_dir() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/annotext");
        PathBuf::from(config_dir.as_ref())
    }

    /// Reads the style set this config points at.
    pub fn load_styles(&self) -> Result<StyleSet, ConfigError> {
        StyleSet::load_from_path(&self.styles_path)
    }
}

pub(crate) fn expand_path(path: &Path) -> Option<PathBuf> {
    let path_str = path.to_string_lossy();
    match shellexpand::full(&path_str) {
        Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
        Err(_) => None,
    }
}
