//! Server and client configuration

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::paths;

/// Top-level configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Root of the markdown content tree
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    /// Site owner details used by whoami, contact, neofetch and the link commands
    #[serde(default)]
    pub profile: Profile,
    /// REPL client settings
    #[serde(default)]
    pub repl: ReplConfig,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            content_dir: default_content_dir(),
            profile: Profile::default(),
            repl: ReplConfig::default(),
        }
    }
}

/// Site owner profile
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub handle: String,
    pub hostname: String,
    pub bio: String,
    pub email: String,
    pub github_url: String,
    pub x_url: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Site Owner".to_string(),
            handle: "guest".to_string(),
            hostname: "site".to_string(),
            bio: "Software engineer. Writes about systems, tools and the occasional TIL.".to_string(),
            email: "hello@example.com".to_string(),
            github_url: "https://github.com/".to_string(),
            x_url: "https://x.com/".to_string(),
        }
    }
}

/// REPL client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Base URL of the site serving `/api/commands`
    pub endpoint: String,
    /// Maximum persisted history entries
    pub history_limit: usize,
    /// Per-request timeout in seconds (0 = none)
    pub request_timeout_secs: u64,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000".to_string(),
            history_limit: 100,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults when absent
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the config file from the environment and apply env overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::load(paths::config_path())?;

        if let Some(dir) = paths::content_dir_override() {
            config.content_dir = dir;
        }
        if let Ok(addr) = std::env::var("SITETERM_LISTEN") {
            config.listen_addr = addr
                .parse()
                .with_context(|| format!("invalid SITETERM_LISTEN: {}", addr))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
content_dir = "/srv/content"

[profile]
name = "Ada"
"#,
        )
        .unwrap();

        assert_eq!(config.content_dir, PathBuf::from("/srv/content"));
        assert_eq!(config.profile.name, "Ada");
        assert_eq!(config.profile.handle, "guest");
        assert_eq!(config.repl.history_limit, 100);
        assert_eq!(config.listen_addr, default_listen_addr());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/siteterm.toml").unwrap();
        assert_eq!(config.repl.request_timeout_secs, 10);
    }

    #[test]
    fn test_invalid_toml_errors() {
        assert!(Config::from_toml("listen_addr = 5").is_err());
    }
}
