//! Stylesheet system for circuit colors and fonts
//!
//! Colors are exposed to the SVG as CSS custom properties (`--wire`,
//! `--gate-fill`, ...), so a stylesheet only has to name the tokens it wants
//! to change. Anything it leaves out falls back to the default palette.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Font used for gate labels, channel names and captions
#[derive(Debug, Clone, PartialEq)]
pub struct FontSettings {
    pub family: String,
    pub size: f64,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: "'Bookman Old Style', Century, Courier, serif".to_string(),
            size: 14.0,
        }
    }
}

/// A stylesheet mapping color tokens to concrete values
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Color mappings: token name -> CSS color, sorted for stable output
    pub colors: BTreeMap<String, String>,
    pub font: FontSettings,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: BTreeMap<String, String>,
    font: Option<TomlFont>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TomlFont {
    family: Option<String>,
    size: Option<f64>,
}

/// Color tokens every rendered circuit uses
pub const COLOR_TOKENS: &[&str] = &[
    "background",
    "wire",
    "gate-fill",
    "gate-stroke",
    "text",
    "node",
    "subroutine",
];

/// Default palette: black lines on white, like a textbook circuit
const DEFAULT_PALETTE: &str = r##"
[colors]
background = "#ffffff"
wire = "#000000"
gate-fill = "#ffffff"
gate-stroke = "#000000"
text = "#000000"
node = "#000000"
subroutine = "#333333"
"##;

impl Stylesheet {
    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load stylesheet from TOML string
    pub fn from_str(content: &str) -> Result<Self, StylesheetError> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        let defaults = FontSettings::default();
        let font = match parsed.font {
            Some(font) => FontSettings {
                family: font.family.unwrap_or(defaults.family),
                size: font.size.unwrap_or(defaults.size),
            },
            None => defaults,
        };

        Ok(Stylesheet {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            colors: parsed.colors,
            font,
        })
    }

    /// Resolve a color token to a concrete value
    ///
    /// Returns None if the token is not defined in this stylesheet.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(|s| s.as_str())
    }

    /// Resolve a color token with fallback to the default palette
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }

        let default = Self::default();
        if let Some(color) = default.resolve(token) {
            return color.to_string();
        }

        if token == "background" || token == "gate-fill" {
            "#ffffff".to_string()
        } else {
            "#000000".to_string()
        }
    }

    /// Every token the renderer needs plus any extra ones, fully resolved
    pub fn resolved_colors(&self) -> BTreeMap<String, String> {
        let mut colors: BTreeMap<String, String> = COLOR_TOKENS
            .iter()
            .map(|token| (token.to_string(), self.resolve_or_default(token)))
            .collect();
        for (token, value) in &self.colors {
            colors.insert(token.clone(), value.clone());
        }
        colors
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::from_str(DEFAULT_PALETTE).unwrap_or_else(|_| Stylesheet {
            name: None,
            description: None,
            colors: BTreeMap::new(),
            font: FontSettings::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stylesheet() {
        let stylesheet = Stylesheet::default();
        for token in COLOR_TOKENS {
            assert!(stylesheet.colors.contains_key(*token), "missing {}", token);
        }
        assert_eq!(stylesheet.font.size, 14.0);
    }

    #[test]
    fn test_resolve_existing_token() {
        let stylesheet = Stylesheet::default();
        assert_eq!(stylesheet.resolve("wire"), Some("#000000"));
        assert_eq!(stylesheet.resolve("gate-fill"), Some("#ffffff"));
    }

    #[test]
    fn test_resolve_missing_token() {
        let stylesheet = Stylesheet::default();
        assert_eq!(stylesheet.resolve("nonexistent"), None);
    }

    #[test]
    fn test_resolve_or_default_fallback() {
        let empty = Stylesheet {
            name: None,
            description: None,
            colors: BTreeMap::new(),
            font: FontSettings::default(),
        };
        assert_eq!(empty.resolve_or_default("subroutine"), "#333333");
        assert_eq!(empty.resolve_or_default("unknown"), "#000000");
    }

    #[test]
    fn test_partial_stylesheet_is_completed() {
        let stylesheet = Stylesheet::from_str(
            r##"
[colors]
wire = "#0000ff"
highlight = "#ff0000"
"##,
        )
        .expect("Should parse");

        let colors = stylesheet.resolved_colors();
        assert_eq!(colors["wire"], "#0000ff");
        assert_eq!(colors["gate-stroke"], "#000000");
        assert_eq!(colors["highlight"], "#ff0000");
    }

    #[test]
    fn test_parse_toml_with_metadata_and_font() {
        let toml_str = r##"
[metadata]
name = "Dark"
description = "Light lines on black"

[colors]
background = "#000000"

[font]
size = 18.0
"##;
        let stylesheet = Stylesheet::from_str(toml_str).expect("Should parse");
        assert_eq!(stylesheet.name, Some("Dark".to_string()));
        assert_eq!(stylesheet.description, Some("Light lines on black".to_string()));
        assert_eq!(stylesheet.resolve("background"), Some("#000000"));
        assert_eq!(stylesheet.font.size, 18.0);
        assert_eq!(stylesheet.font.family, FontSettings::default().family);
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        let result = Stylesheet::from_str(invalid);
        assert!(result.is_err());
    }
}
