use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::Client;
use crate::transport::Connector;

/// Environment variable overriding the API key
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the default timeout (seconds)
pub const ENV_TIMEOUT: &str = "OPENAI_TIMEOUT";

/// Client settings as stored on disk
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Default request timeout in seconds (0 = none)
    #[serde(default)]
    pub timeout: i64,
}

// Keep the key out of logs
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .context("Could not determine config directory")
            .map(|d| d.join("baish"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Self::config_dir().map(|d| d.join("openai.toml"))
    }

    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::config_path()?)?;
        settings.apply_env(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Load settings from a TOML file, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save settings as TOML
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Override fields from environment variables
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = var(ENV_BASE_URL) {
            self.base_url = Some(url);
        }
        if let Some(timeout) = var(ENV_TIMEOUT) {
            self.timeout = timeout
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT} must be a whole number of seconds"))?;
        }
        Ok(())
    }

    /// Push these settings into a client and initialize it
    pub fn configure<C: Connector>(&self, client: &mut Client<C>) -> Result<()> {
        if let Some(url) = &self.base_url {
            client.set_base_url(Some(url));
        }
        client.set_timeout(self.timeout);
        client
            .init(self.api_key.as_deref())
            .context("Failed to start HTTP engine")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_toml_deserialization() {
        let toml = r#"
            api_key = "sk-file"
            base_url = "http://localhost:8080/v1"
            timeout = 30
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("sk-file"));
        assert_eq!(settings.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(settings.timeout, 30);
    }

    #[test]
    fn test_toml_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut settings = Settings {
            api_key: Some("sk-file".to_string()),
            base_url: None,
            timeout: 10,
        };
        settings
            .apply_env(env(&[
                (ENV_API_KEY, "sk-env"),
                (ENV_BASE_URL, "http://127.0.0.1:9000/v1"),
                (ENV_TIMEOUT, " 45 "),
            ]))
            .unwrap();

        assert_eq!(settings.api_key.as_deref(), Some("sk-env"));
        assert_eq!(settings.base_url.as_deref(), Some("http://127.0.0.1:9000/v1"));
        assert_eq!(settings.timeout, 45);
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut settings = Settings {
            api_key: Some("sk-file".to_string()),
            ..Default::default()
        };
        settings.apply_env(env(&[(ENV_API_KEY, "")])).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn test_bad_timeout_env() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(env(&[(ENV_TIMEOUT, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT));
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = Settings {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
