//! Configuration loading, validation, and management for Rendition.
//!
//! Loads configuration from `~/.rendition/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rendition_core::conventions::{DEFAULT_TIMESTAMP_FORMAT, is_valid_timestamp_format};
use rendition_core::emit::is_valid_callback;
use rendition_core::{Conventions, EncodeOptions, ResponseDefaults};

/// The root configuration structure.
///
/// Maps directly to `~/.rendition/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenditionConfig {
    /// Defaults for the stock JSON / JSONP formatters
    #[serde(default)]
    pub response: ResponseConfig,

    /// The `success` / `error` macros seeded at boot
    #[serde(default)]
    pub conventions: ConventionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseConfig {
    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(default = "default_callback")]
    pub jsonp_callback: String,

    /// Extra headers sent with every stock response
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub encoding: EncodeOptions,
}

fn default_status() -> u16 {
    200
}
fn default_callback() -> String {
    "jsonp".into()
}
fn default_true() -> bool {
    true
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            status: default_status(),
            jsonp_callback: default_callback(),
            headers: BTreeMap::new(),
            encoding: EncodeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConventionsConfig {
    /// Register `success` / `error` at boot (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_success_message")]
    pub success_message: String,

    #[serde(default = "default_error_message")]
    pub error_message: String,

    /// `strftime` pattern, rendered in UTC
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_success_message() -> String {
    "SUCCESS".into()
}
fn default_error_message() -> String {
    "ERROR".into()
}
fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.into()
}

impl Default for ConventionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            success_message: default_success_message(),
            error_message: default_error_message(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl RenditionConfig {
    /// Load configuration from the default path (~/.rendition/config.toml).
    ///
    /// Environment variables override the file:
    /// - `RENDITION_STATUS`
    /// - `RENDITION_JSONP_CALLBACK`
    /// - `RENDITION_PRETTY` (`1`/`true` to pretty-print)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides read through `lookup` (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(status) = lookup("RENDITION_STATUS") {
            self.response.status = status.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "RENDITION_STATUS is not a status code: {status}"
                ))
            })?;
        }

        if let Some(callback) = lookup("RENDITION_JSONP_CALLBACK") {
            self.response.jsonp_callback = callback;
        }

        if let Some(pretty) = lookup("RENDITION_PRETTY") {
            self.response.encoding.pretty_print =
                matches!(pretty.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rendition")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(100..=599).contains(&self.response.status) {
            return Err(ConfigError::ValidationError(format!(
                "response.status must be between 100 and 599, got {}",
                self.response.status
            )));
        }

        if !is_valid_callback(&self.response.jsonp_callback) {
            return Err(ConfigError::ValidationError(format!(
                "response.jsonp_callback is not a valid JavaScript identifier: {:?}",
                self.response.jsonp_callback
            )));
        }

        if !is_valid_timestamp_format(&self.conventions.timestamp_format) {
            return Err(ConfigError::ValidationError(format!(
                "conventions.timestamp_format is not a valid strftime pattern: {:?}",
                self.conventions.timestamp_format
            )));
        }

        Ok(())
    }

    /// Defaults for builders created from this configuration.
    pub fn response_defaults(&self) -> ResponseDefaults {
        ResponseDefaults {
            status: self.response.status,
            headers: self
                .response
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            options: self.response.encoding,
            callback: self.response.jsonp_callback.clone(),
        }
    }

    /// Defaults for the `success` / `error` macros.
    pub fn conventions(&self) -> Conventions {
        Conventions {
            success_message: self.conventions.success_message.clone(),
            error_message: self.conventions.error_message.clone(),
            timestamp_format: self.conventions.timestamp_format.clone(),
        }
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = RenditionConfig::default();
        assert_eq!(config.response.status, 200);
        assert_eq!(config.response.jsonp_callback, "jsonp");
        assert!(config.response.encoding.unescaped_unicode);
        assert!(config.conventions.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = RenditionConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RenditionConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.response.status, config.response.status);
        assert_eq!(parsed.response.encoding, config.response.encoding);
        assert_eq!(
            parsed.conventions.timestamp_format,
            config.conventions.timestamp_format
        );
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
[response]
status = 201

[response.headers]
X-Powered-By = "rendition"

[response.encoding]
pretty_print = true

[conventions]
success_message = "ok"
"#;
        let config: RenditionConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.response.status, 201);
        assert_eq!(config.response.jsonp_callback, "jsonp");
        assert!(config.response.encoding.pretty_print);
        assert!(config.response.encoding.unescaped_unicode);
        assert_eq!(config.conventions.success_message, "ok");
        assert_eq!(config.conventions.error_message, "ERROR");

        let defaults = config.response_defaults();
        assert_eq!(defaults.status, 201);
        assert_eq!(
            defaults.headers,
            vec![("X-Powered-By".to_string(), "rendition".to_string())]
        );
        assert_eq!(config.conventions().success_message, "ok");
    }

    #[test]
    fn invalid_status_rejected() {
        let mut config = RenditionConfig::default();
        config.response.status = 999;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_callback_rejected() {
        let mut config = RenditionConfig::default();
        config.response.jsonp_callback = "alert(1)".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn invalid_timestamp_format_rejected() {
        let mut config = RenditionConfig::default();
        config.conventions.timestamp_format = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = RenditionConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().response.status, 200);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[response]\njsonp_callback = \"app.cb\"").unwrap();
        let config = RenditionConfig::load_from(file.path()).unwrap();
        assert_eq!(config.response.jsonp_callback, "app.cb");
    }

    #[test]
    fn unparsable_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[response\nstatus = ").unwrap();
        let err = RenditionConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[response]\nstatus = 42").unwrap();
        let err = RenditionConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("RENDITION_STATUS", "202"),
            ("RENDITION_JSONP_CALLBACK", "handle"),
            ("RENDITION_PRETTY", "true"),
        ]);
        let mut config = RenditionConfig::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.response.status, 202);
        assert_eq!(config.response.jsonp_callback, "handle");
        assert!(config.response.encoding.pretty_print);
    }

    #[test]
    fn env_status_must_parse() {
        let mut config = RenditionConfig::default();
        let err = config
            .apply_env(|name| (name == "RENDITION_STATUS").then(|| "abc".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = RenditionConfig::default_toml();
        assert!(toml_str.contains("jsonp_callback"));
        assert!(toml_str.contains("SUCCESS"));
    }
}
