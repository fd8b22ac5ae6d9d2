//! Preference commands: theme, particles, mode

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::{CommandOutput, Invocation};
use crate::html;
use crate::protocol::{ActionKind, ActionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Canonical id sent to the client
    pub id: &'static str,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

pub const THEMES: &[Theme] = &[
    Theme { id: "default", name: "Default", aliases: &["reset"] },
    Theme { id: "dracula", name: "Dracula", aliases: &["vampire"] },
    Theme { id: "nord", name: "Nord", aliases: &["arctic"] },
    Theme { id: "gruvbox", name: "Gruvbox", aliases: &["gruv", "retro"] },
    Theme { id: "catppuccin", name: "Catppuccin Mocha", aliases: &["cat", "mocha"] },
    Theme { id: "tokyo-night", name: "Tokyo Night", aliases: &["tokyo", "tn"] },
    Theme { id: "solarized", name: "Solarized", aliases: &["solar"] },
    Theme { id: "rose-pine", name: "Rosé Pine", aliases: &["rosepine", "rose"] },
    Theme { id: "everforest", name: "Everforest", aliases: &["forest"] },
];

fn theme_lookup() -> &'static HashMap<&'static str, &'static Theme> {
    static LOOKUP: OnceLock<HashMap<&'static str, &'static Theme>> = OnceLock::new();
    LOOKUP.get_or_init(|| {
        let mut map = HashMap::new();
        for theme in THEMES {
            map.insert(theme.id, theme);
            for alias in theme.aliases {
                map.insert(*alias, theme);
            }
        }
        map
    })
}

/// Resolve a theme id or alias, case-insensitively
pub fn resolve_theme(name: &str) -> Option<&'static Theme> {
    theme_lookup().get(name.to_lowercase().as_str()).copied()
}

/// Background particle density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleLevel {
    Off,
    Low,
    Medium,
    High,
}

impl ParticleLevel {
    pub const ALL: [ParticleLevel; 4] = [
        ParticleLevel::Off,
        ParticleLevel::Low,
        ParticleLevel::Medium,
        ParticleLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleLevel::Off => "off",
            ParticleLevel::Low => "low",
            ParticleLevel::Medium => "medium",
            ParticleLevel::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == s)
    }
}

/// Light or dark colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Light,
    Dark,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(ColorMode::Light),
            "dark" => Some(ColorMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ColorMode::Light => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
        }
    }
}

pub(super) fn theme(inv: &Invocation<'_>) -> CommandOutput {
    let Some(name) = inv.arg(0) else {
        let mut out = String::from("Available themes:\n");
        for theme in THEMES {
            out.push_str(&format!(
                "  {}{}  {}\n",
                html::command(theme.id),
                " ".repeat(12usize.saturating_sub(theme.id.len())),
                html::dim(&format!("aliases: {}", theme.aliases.join(", ")))
            ));
        }
        out.push_str(&html::dim("Usage: theme <name>"));
        return CommandOutput::message(out);
    };

    match resolve_theme(name) {
        Some(theme) => ActionResult::new(ActionKind::Theme)
            .with_theme(theme.id)
            .with_message(format!("Theme set to {}", html::escape(theme.name)))
            .into(),
        None => CommandOutput::error(&format!(
            "theme: unknown theme '{}'. Run 'theme' to list themes.",
            name
        )),
    }
}

pub(super) fn particles(inv: &Invocation<'_>) -> CommandOutput {
    let options: Vec<&str> = ParticleLevel::ALL.iter().map(|l| l.as_str()).collect();

    let Some(value) = inv.arg(0) else {
        return CommandOutput::message(format!(
            "Particle density: {}\n{}",
            options
                .iter()
                .map(|o| html::command(o))
                .collect::<Vec<_>>()
                .join(" | "),
            html::dim("Usage: particles <level>")
        ));
    };

    match ParticleLevel::parse(&value.to_lowercase()) {
        Some(level) => ActionResult::new(ActionKind::Particles)
            .with_value(level.as_str())
            .with_message(format!("Particles set to {}", level.as_str()))
            .into(),
        None => CommandOutput::error(&format!(
            "particles: invalid level '{}' (expected {})",
            value,
            options.join(", ")
        )),
    }
}

pub(super) fn mode(inv: &Invocation<'_>) -> CommandOutput {
    let Some(value) = inv.arg(0) else {
        return CommandOutput::action(ActionKind::ToggleMode);
    };

    match ColorMode::parse(&value.to_lowercase()) {
        Some(mode) => ActionResult::new(ActionKind::SetMode)
            .with_value(mode.as_str())
            .with_message(format!("Switched to {} mode", mode.as_str()))
            .into(),
        None => CommandOutput::error(&format!("mode: invalid mode '{}' (expected light or dark)", value)),
    }
}
