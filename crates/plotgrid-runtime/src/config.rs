#![forbid(unsafe_code)]

//! Runtime configuration: input policy and key bindings.
//!
//! [`GridConfig`] bundles it with the layout so a host can load a whole
//! grid from one file:
//!
//! ```toml
//! [runtime]
//! ignore_synthetic_pointer = true
//!
//! [runtime.actions]
//! h = "harvest"
//! w = "water"
//!
//! [layout]
//! viewport = { width = 1280.0, height = 720.0 }
//!
//! [[layout.assignments]]
//! coord = { x = 0, y = 0 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use plotgrid_core::GridError;
use plotgrid_layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::keymap::KeyMap;

/// Input policy for the grid consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Drop pointer events the platform synthesized from touch input, so a
    /// touch is handled once (as touch) rather than twice.
    pub ignore_synthetic_pointer: bool,
    /// Single-character key → host action name.
    pub actions: BTreeMap<String, String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ignore_synthetic_pointer: true,
            actions: BTreeMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Bind `key` to `action`.
    #[must_use]
    pub fn with_action(mut self, key: char, action: impl Into<String>) -> Self {
        self.actions.insert(key.to_string(), action.into());
        self
    }

    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GridError> {
        toml::from_str(s).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, GridError> {
        serde_json::from_str(s).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Validate parameters. An empty list means every binding is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (key, action) in &self.actions {
            if single_char(key).is_none() {
                errors.push(format!("actions.{key:?} must be a single character"));
            }
            if action.trim().is_empty() {
                errors.push(format!("actions.{key:?} has an empty action name"));
            }
        }
        errors
    }

    /// Build the key map. Unusable bindings are skipped with a warning.
    #[must_use]
    pub fn keymap(&self) -> KeyMap {
        let mut map = KeyMap::new();
        for (key, action) in &self.actions {
            match single_char(key) {
                Some(c) if !action.trim().is_empty() => {
                    map.bind(c, action.trim());
                }
                _ => warn!(key = key.as_str(), action = action.as_str(), "skipping key binding"),
            }
        }
        map
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Layout plus runtime policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub layout: LayoutConfig,
    pub runtime: RuntimeConfig,
}

impl GridConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GridError> {
        toml::from_str(s).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GridError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, GridError> {
        serde_json::from_str(s).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Problems from both halves, layout first.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.layout.validate();
        errors.extend(self.runtime.validate());
        errors
    }
}
