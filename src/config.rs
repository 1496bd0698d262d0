use crate::catalog::PaletteSection;
use crate::error::ConfigError;
use crate::graph::{Position, Size};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Tunables for one editor session. Every field has a default, so an empty
/// JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Size given to newly placed nodes.
    pub node_size: Size,
    /// Where a node lands when placed without an explicit position.
    pub drop_position: Position,
    pub debounce: DebounceConfig,
    pub limits: DialogLimits,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            node_size: Size::default(),
            drop_position: Position::new(100.0, 100.0),
            debounce: DebounceConfig::default(),
            limits: DialogLimits::default(),
        }
    }
}

/// Palette refresh debounce per catalog section, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebounceConfig {
    pub elements_ms: u64,
    pub skills_ms: u64,
    pub colors_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            elements_ms: 400,
            skills_ms: 100,
            colors_ms: 100,
        }
    }
}

impl DebounceConfig {
    pub fn delay(&self, section: PaletteSection) -> Duration {
        let ms = match section {
            PaletteSection::Elements => self.elements_ms,
            PaletteSection::Skills => self.skills_ms,
            PaletteSection::Colors => self.colors_ms,
            PaletteSection::TimeEvents => 0,
        };
        Duration::from_millis(ms)
    }
}

/// Upper bounds accepted by the node edit dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DialogLimits {
    pub key_up_delay_max: u32,
    pub timer_duration_max: u32,
}

impl Default for DialogLimits {
    fn default() -> Self {
        Self {
            key_up_delay_max: 10_000,
            timer_duration_max: 999_999,
        }
    }
}

impl EditorConfig {
    /// Loads the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
