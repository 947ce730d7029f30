// SPDX-License-Identifier: AGPL-3.0-or-later
//! Editor configuration and the startup style map

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::model::InlineStyle;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "editorData";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mention style {0} is not declared in the style map")]
    UndeclaredMentionStyle(String),

    #[error("Storage key must not be empty")]
    EmptyStorageKey,
}

/// Visual attributes of a custom inline style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<u16>,
}

/// Style name to visual attributes, declared once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<String, StyleAttributes>);

impl StyleMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn declare(&mut self, name: impl Into<String>, attributes: StyleAttributes) {
        self.0.insert(name.into(), attributes);
    }

    pub fn get(&self, name: &str) -> Option<&StyleAttributes> {
        self.0.get(name)
    }

    /// Built-in styles are always recognized, custom ones only if declared
    pub fn is_recognized(&self, style: &InlineStyle) -> bool {
        style.is_builtin() || self.0.contains_key(style.name())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for StyleMap {
    fn default() -> Self {
        let mut map = Self::new();
        map.declare(
            "CODE",
            StyleAttributes {
                background_color: Some("rgba(0, 0, 0, 0.05)".to_string()),
                font_family: Some("\"Inconsolata\", \"Menlo\", \"Consolas\", monospace".to_string()),
                font_size: Some(16),
                padding: Some(2),
                ..Default::default()
            },
        );
        map.declare(
            "RED_COLOR",
            StyleAttributes {
                color: Some("rgba(255, 0, 0, 0.7)".to_string()),
                background_color: Some("red".to_string()),
                ..Default::default()
            },
        );
        map.declare(
            "Bold",
            StyleAttributes {
                font_weight: Some(8),
                ..Default::default()
            },
        );
        map
    }
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Key the snapshot is stored under
    pub storage_key: String,
    /// Style applied by the `@` trigger
    pub mention_style: InlineStyle,
    pub style_map: StyleMap,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            mention_style: InlineStyle::new("RED_COLOR"),
            style_map: StyleMap::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if !self.style_map.is_recognized(&self.mention_style) {
            return Err(ConfigError::UndeclaredMentionStyle(
                self.mention_style.name().to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_key, "editorData");
        assert!(config.style_map.get("RED_COLOR").is_some());
    }

    #[test]
    fn test_parse_toml() {
        let config = EditorConfig::from_toml_str(
            r#"
            storage_key = "notes"
            mention_style = "MENTION"

            [style_map.MENTION]
            color = "blue"
            font_weight = 700
            "#,
        )
        .unwrap();
        assert_eq!(config.storage_key, "notes");
        assert_eq!(config.mention_style, InlineStyle::new("MENTION"));
        assert_eq!(
            config.style_map.get("MENTION").and_then(|a| a.color.as_deref()),
            Some("blue")
        );
        assert!(config.style_map.get("RED_COLOR").is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_undeclared_mention_style_rejected() {
        let result = EditorConfig::from_toml_str(
            r#"
            mention_style = "PURPLE"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::UndeclaredMentionStyle(s)) if s == "PURPLE"));
    }

    #[test]
    fn test_builtin_mention_style_accepted() {
        let config = EditorConfig::from_toml_str("mention_style = \"BOLD\"").unwrap();
        assert_eq!(config.mention_style, InlineStyle::Bold);
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        assert!(matches!(
            EditorConfig::from_toml_str("storage_key = \"\""),
            Err(ConfigError::EmptyStorageKey)
        ));
    }
}
