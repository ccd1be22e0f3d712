//! Configuration module
//!
//! Settings come from, lowest precedence first: built-in defaults, an
//! explicit TOML file (`--config`), then environment variables and flags
//! (clap binds both).

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:35678";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub output: OutputFormat,
}

/// Connection settings for the RPC sidecar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Base URL (e.g., "http://127.0.0.1:35678")
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output: Option<OutputFormat>,
}

impl Config {
    /// Load config: defaults, then the optional file, then overrides
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        if config.server.timeout_secs == 0 {
            bail!("invalid timeout 0 (expected at least 1 second)");
        }
        Ok(config)
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Copy safe for display: the token is masked
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.server.token.is_some() {
            shown.server.token = Some("********".to_string());
        }
        shown
    }

    fn apply(&mut self, overrides: &Overrides) {
        if let Some(url) = overrides.server.as_ref().filter(|s| !s.is_empty()) {
            self.server.url = url.clone();
        }
        if let Some(token) = overrides.token.as_ref().filter(|s| !s.is_empty()) {
            self.server.token = Some(token.clone());
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.server.timeout_secs = timeout;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::load(None, &Overrides::default())?;
        assert_eq!(config.server.url, DEFAULT_SERVER_URL);
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.server.token, None);
        assert_eq!(config.output, OutputFormat::Text);
        Ok(())
    }

    #[test]
    fn test_file_then_overrides() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "output = \"yaml\"\n\n[server]\nurl = \"http://10.0.0.5:9000\"\ntoken = \"abc\"\n",
        )?;

        let config = Config::load(Some(&path), &Overrides::default())?;
        assert_eq!(config.server.url, "http://10.0.0.5:9000");
        assert_eq!(config.server.token.as_deref(), Some("abc"));
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.output, OutputFormat::Yaml);

        let overrides = Overrides {
            server: Some("http://localhost:1".into()),
            token: None,
            timeout_secs: Some(5),
            output: Some(OutputFormat::Json),
        };
        let config = Config::load(Some(&path), &overrides)?;
        assert_eq!(config.server.url, "http://localhost:1");
        assert_eq!(config.server.token.as_deref(), Some("abc"));
        assert_eq!(config.server.timeout_secs, 5);
        assert_eq!(config.output, OutputFormat::Json);
        Ok(())
    }

    #[test]
    fn test_empty_override_is_ignored() -> Result<()> {
        let overrides = Overrides {
            server: Some(String::new()),
            ..Default::default()
        };
        let config = Config::load(None, &overrides)?;
        assert_eq!(config.server.url, DEFAULT_SERVER_URL);
        Ok(())
    }

    #[test]
    fn test_zero_timeout_in_file_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\ntimeout_secs = 0\n")?;

        let err = Config::load(Some(&path), &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("invalid timeout 0"));

        let overrides = Overrides {
            timeout_secs: Some(3),
            ..Default::default()
        };
        assert_eq!(Config::load(Some(&path), &overrides)?.server.timeout_secs, 3);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/agent-editor.toml")), &Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_redacted_masks_token() {
        let mut config = Config::default();
        assert_eq!(config.redacted().server.token, None);

        config.server.token = Some("secret".into());
        assert_eq!(config.redacted().server.token.as_deref(), Some("********"));
        assert_eq!(config.server.token.as_deref(), Some("secret"));
    }
}
