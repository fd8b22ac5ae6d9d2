//! Centralized path resolution for siteterm
//!
//! Follows XDG Base Directory Specification with env var overrides.
//!
//! ## Directory Layout
//!
//! ```text
//! ~/.local/share/siteterm/     (XDG_DATA_HOME)
//! └── session.json             (REPL history and preferences)
//!
//! ~/.config/siteterm/          (XDG_CONFIG_HOME)
//! └── siteterm.toml
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SITETERM_CONFIG` | Config file | `~/.config/siteterm/siteterm.toml` |
//! | `SITETERM_CONTENT` | Content root | from config, else `./content` |
//! | `SITETERM_HISTORY` | REPL session store | `~/.local/share/siteterm/session.json` |

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the XDG data directory for siteterm
///
/// Priority: `XDG_DATA_HOME` > `~/.local/share`
pub fn data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("siteterm");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/share/siteterm");
    }

    PathBuf::from(".")
}

/// Get the XDG config directory for siteterm
///
/// Priority: `XDG_CONFIG_HOME` > `~/.config`
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("siteterm");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/siteterm");
    }

    PathBuf::from(".")
}

/// Priority: `SITETERM_CONFIG` env var > `config_dir()/siteterm.toml`
pub fn config_path() -> PathBuf {
    std::env::var("SITETERM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("siteterm.toml"))
}

/// `SITETERM_CONTENT`, when set
pub fn content_dir_override() -> Option<PathBuf> {
    std::env::var("SITETERM_CONTENT").ok().map(PathBuf::from)
}

/// Priority: `SITETERM_HISTORY` env var > `data_dir()/session.json`
pub fn session_store_path() -> PathBuf {
    std::env::var("SITETERM_HISTORY")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("session.json"))
}

/// Create the parent directory of a file if needed
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("creating directory: {}", parent.display());
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Log resolved paths for discoverability
pub fn log_paths() {
    use tracing::info;
    info!("📂 config: {}", config_path().display());
    info!("📂 session store: {}", session_store_path().display());
}
