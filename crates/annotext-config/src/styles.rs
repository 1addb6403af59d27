//! User-editable annotation style presets.
//!
//! Presets live in a TOML file keyed by style name:
//!
//! ```toml
//! [styles.Note]
//! foreground = "#1F4E79"
//! background = "yellow"
//! font_size = 18.0
//! weight = "bold"
//! ```
//!
//! Fields left out fall back to the built-in default preset. The name
//! `"default"` is reserved for that built-in preset and is never written to
//! the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::ConfigError;

/// Name that always resolves to [`Preset::builtin_default`].
pub const DEFAULT_STYLE: &str = "default";

const NEW_STYLE_PREFIX: &str = "New Style ";
const MIN_FONT_SIZE: f32 = 10.0;
const MAX_FONT_SIZE: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStretch {
    Condensed,
    #[default]
    Normal,
    Expanded,
}

/// Display formatting applied to an annotation overlay.
///
/// Colors are kept as written (`#RRGGBB` or a color name) and interpreted by
/// the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub foreground: String,
    pub background: String,
    pub font_family: String,
    pub font_size: f32,
    pub style: FontStyle,
    pub weight: FontWeight,
    pub stretch: FontStretch,
}

impl Preset {
    /// Black on white, Times New Roman at 16.
    pub fn builtin_default() -> Self {
        Self {
            foreground: "black".to_string(),
            background: "white".to_string(),
            font_family: "Times New Roman".to_string(),
            font_size: 16.0,
            style: FontStyle::Normal,
            weight: FontWeight::Normal,
            stretch: FontStretch::Normal,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(ConfigError::FontSizeOutOfRange(self.font_size));
        }
        Ok(())
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::builtin_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleSet {
    #[serde(default)]
    styles: BTreeMap<String, Preset>,
    #[serde(skip)]
    builtin: Preset,
}

impl StyleSet {
    /// Loads presets from `path`. A missing file is an empty set.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
                config_path: path.to_path_buf(),
                source,
            })?;

        Self::from_toml(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut set: StyleSet = toml::from_str(content)?;
        // the built-in preset always wins over anything stored under its name
        set.styles.remove(DEFAULT_STYLE);
        Ok(set)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Looks up a user preset. `"default"` is not a user preset.
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.styles.get(name)
    }

    /// Returns the preset for `name` and whether the built-in default was used instead.
    pub fn resolve(&self, name: &str) -> (&Preset, bool) {
        match self.styles.get(name) {
            Some(preset) => (preset, false),
            None => (&self.builtin, true),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Style names in sorted order, without the reserved default.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Adds or replaces a preset, returning the one it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        preset: Preset,
    ) -> Result<Option<Preset>, ConfigError> {
        let name = name.into();
        if name == DEFAULT_STYLE {
            return Err(ConfigError::ReservedStyleName(name));
        }
        preset.validate()?;
        Ok(self.styles.insert(name, preset))
    }

    pub fn remove(&mut self, name: &str) -> Option<Preset> {
        self.styles.remove(name)
    }

    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> Result<(), ConfigError> {
        let to = to.into();
        if to == DEFAULT_STYLE {
            return Err(ConfigError::ReservedStyleName(to));
        }
        if self.styles.contains_key(&to) {
            return Err(ConfigError::DuplicateStyle(to));
        }
        let preset = self
            .styles
            .remove(from)
            .ok_or_else(|| ConfigError::UnknownStyle(from.to_string()))?;
        self.styles.insert(to, preset);
        Ok(())
    }

    /// Adds a copy of the default preset under the next free `"New Style N"` name.
    pub fn add_new_style(&mut self) -> String {
        let name = self.next_new_style_name();
        self.styles.insert(name.clone(), Preset::builtin_default());
        name
    }

    /// `"New Style N"` where N is one past the highest numbered new style.
    pub fn next_new_style_name(&self) -> String {
        let highest = self
            .styles
            .keys()
            .filter_map(|name| name.strip_prefix(NEW_STYLE_PREFIX))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{NEW_STYLE_PREFIX}{}", highest + 1)
    }
}
