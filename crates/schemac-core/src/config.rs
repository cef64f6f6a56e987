//! Configuration schema (schemac.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// SQL emission settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlConfig {
    /// Character set of every created database
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Collation of every created database
    #[serde(default = "default_collation")]
    pub collation: String,
}

fn default_charset() -> String {
    "utf8mb4".to_string()
}

fn default_collation() -> String {
    "utf8mb4_unicode_ci".to_string()
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            charset: default_charset(),
            collation: default_collation(),
        }
    }
}

/// Descriptor emission settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// File extension of descriptor files
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "js".to_string()
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `<name>.json` schema documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving emitted artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub sql: SqlConfig,

    #[serde(default)]
    pub descriptor: DescriptorConfig,
}

impl Config {
    /// Load config from TOML file
    ///
    /// Relative directories are resolved against the config file's parent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        if let Some(parent) = path.parent() {
            config.input_dir = config.input_dir.map(|dir| parent.join(dir));
            config.output_dir = config.output_dir.map(|dir| parent.join(dir));
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.sql.charset, "utf8mb4");
        assert_eq!(config.sql.collation, "utf8mb4_unicode_ci");
        assert_eq!(config.descriptor.extension, "js");
        assert!(config.input_dir.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            input_dir = "schemas"

            [sql]
            collation = "utf8mb4_bin"
            "#,
        )
        .unwrap();

        assert_eq!(config.input_dir, Some(PathBuf::from("schemas")));
        assert_eq!(config.sql.charset, "utf8mb4");
        assert_eq!(config.sql.collation, "utf8mb4_bin");
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::from_toml("input_dir = [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn relative_dirs_resolve_against_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemac.toml");
        std::fs::write(
            &path,
            r#"
            input_dir = "schemas"
            output_dir = "/var/build"

            [descriptor]
            extension = "mjs"
            "#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.input_dir, Some(dir.path().join("schemas")));
        assert_eq!(config.output_dir, Some(PathBuf::from("/var/build")));
        assert_eq!(config.descriptor.extension, "mjs");
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config {
            output_dir: Some(PathBuf::from("build")),
            ..Config::default()
        };
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }
}
