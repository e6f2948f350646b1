//! Configuration file loading for lien.
//!
//! Binder options come from `lien.config.json` in the current working
//! directory, or from the file given with `--config` (TOML when the
//! extension is `.toml`, JSON otherwise). Missing keys keep their defaults.

use std::path::{Path, PathBuf};

use lien_atelier_dom::BinderOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file looked up by default
pub const CONFIG_FILE: &str = "lien.config.json";

/// Top-level lien configuration.
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LienConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Formatting options for the number and currency filters.
    #[serde(flatten)]
    pub options: BinderOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load the configuration: the explicit file when given, else
/// `lien.config.json` from the current directory when present, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LienConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let path = std::env::current_dir().unwrap_or_default().join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(LienConfig::default());
    }
    load_config_file(&path)
}

/// Load a configuration file, choosing the format by extension
pub fn load_config_file(path: &Path) -> Result<LienConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let config = if is_toml {
        parse_toml(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        parse_json(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

fn parse_json(content: &str) -> Result<LienConfig, serde_json::Error> {
    serde_json::from_str(content)
}

fn parse_toml(content: &str) -> Result<LienConfig, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_config() {
        let config = parse_json(
            r#"{"$schema": "./lien.schema.json", "currencySymbol": "€", "decimalSymbol": ","}"#,
        )
        .unwrap();
        assert_eq!(config.schema.as_deref(), Some("./lien.schema.json"));
        assert_eq!(config.options.currency_symbol, "€");
        assert_eq!(config.options.decimal_symbol, ",");
        assert_eq!(config.options.number_separator, ",");
    }

    #[test]
    fn test_toml_config() {
        let config = parse_toml("numberSeparator = \" \"\n").unwrap();
        assert_eq!(config.options.number_separator, " ");
        assert_eq!(config.options.currency_symbol, "$");
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_json("{}").unwrap(), LienConfig::default());
        assert_eq!(parse_toml("").unwrap(), LienConfig::default());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some(Path::new("/nonexistent/lien.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
