//! Parser, converter and generator options.
//!
//! [`GpadConfig`] deserializes from YAML or JSON; missing fields take their
//! defaults.
//!
//! ```yaml
//! strict_properties: true
//! sheet_prefix: s
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpadConfig {
    /// Reject property names no codec knows instead of passing them through.
    pub strict_properties: bool,
    /// Let the generator share one sheet between identical style bodies.
    pub merge_style_sheets: bool,
    /// Prefix for shared generated sheet names (`style1`, `style2`, ...).
    pub sheet_prefix: String,
    /// Suffix for per-object generated sheet names (`A` → `AStyle`).
    pub label_sheet_suffix: String,
    /// Order generated statements so that referenced labels come first.
    pub topological_order: bool,
}

impl Default for GpadConfig {
    fn default() -> Self {
        Self {
            strict_properties: false,
            merge_style_sheets: true,
            sheet_prefix: "style".to_string(),
            label_sheet_suffix: "Style".to_string(),
            topological_order: true,
        }
    }
}

impl GpadConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ParseError::new(format!("invalid config: {}", e)))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ParseError::new(format!("invalid config: {}", e)))
    }

    /// Loads a config file; `.json` files are read as JSON, anything else as
    /// YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ParseError::new(format!("cannot read config {}: {}", path.display(), e))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GpadConfig::default();
        assert!(!config.strict_properties);
        assert!(config.merge_style_sheets);
        assert_eq!(config.sheet_prefix, "style");
        assert_eq!(config.label_sheet_suffix, "Style");
        assert!(config.topological_order);
    }

    #[test]
    fn test_partial_yaml() {
        let config = GpadConfig::from_yaml("strict_properties: true\nsheet_prefix: s\n").unwrap();
        assert!(config.strict_properties);
        assert_eq!(config.sheet_prefix, "s");
        assert!(config.merge_style_sheets);
        assert_eq!(GpadConfig::from_yaml("").unwrap(), GpadConfig::default());
    }

    #[test]
    fn test_json() {
        let config = GpadConfig::from_json(r#"{"merge_style_sheets": false}"#).unwrap();
        assert!(!config.merge_style_sheets);
        assert!(GpadConfig::from_json("{").is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = GpadConfig::from_yaml("strict_properties: [1, 2]").unwrap_err();
        assert!(err.message().starts_with("invalid config"));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "topological_order: false").unwrap();
        let config = GpadConfig::from_path(file.path()).unwrap();
        assert!(!config.topological_order);

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"label_sheet_suffix": "S"}}"#).unwrap();
        let config = GpadConfig::from_path(file.path()).unwrap();
        assert_eq!(config.label_sheet_suffix, "S");

        assert!(GpadConfig::from_path("/nonexistent/gpad.yaml").is_err());
    }
}
