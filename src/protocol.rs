//! Wire protocol shared by the dispatcher and the REPL interpreter
//!
//! The action vocabulary lives here and nowhere else. The server serializes
//! `ActionKind` into JSON and the client deserializes the same enum, so an
//! action name can't drift between the two sides.

use serde::{Deserialize, Serialize};

/// Client directive emitted by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Clear,
    OpenUrl,
    Navigate,
    RmRf,
    History,
    Rotate,
    Malware,
    Matrix,
    Fireworks,
    Confetti,
    Rain,
    ToggleMode,
    SetMode,
    Theme,
    Particles,
}

impl ActionKind {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Clear => "clear",
            ActionKind::OpenUrl => "open-url",
            ActionKind::Navigate => "navigate",
            ActionKind::RmRf => "rm-rf",
            ActionKind::History => "history",
            ActionKind::Rotate => "rotate",
            ActionKind::Malware => "malware",
            ActionKind::Matrix => "matrix",
            ActionKind::Fireworks => "fireworks",
            ActionKind::Confetti => "confetti",
            ActionKind::Rain => "rain",
            ActionKind::ToggleMode => "toggle-mode",
            ActionKind::SetMode => "set-mode",
            ActionKind::Theme => "theme",
            ActionKind::Particles => "particles",
        }
    }
}

/// JSON body returned for action-producing commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Argument for `set-mode` and `particles`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            url: None,
            theme: None,
            value: None,
            message: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Outcome of one command line, as sent over HTTP
///
/// `Action` travels as `application/json`, `Html` as `text/html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResponse {
    Action(ActionResult),
    Html(String),
}

impl CommandResponse {
    pub fn action(&self) -> Option<&ActionResult> {
        match self {
            CommandResponse::Action(a) => Some(a),
            CommandResponse::Html(_) => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            CommandResponse::Html(h) => Some(h),
            CommandResponse::Action(_) => None,
        }
    }
}

fn root_referer() -> String {
    "/".to_string()
}

/// Form body posted to the command endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandForm {
    #[serde(default)]
    pub cmd: String,
    #[serde(default = "root_referer")]
    pub referer: String,
}

/// Query string for the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_context")]
    pub context: usize,
}

pub const DEFAULT_CONTEXT_LINES: usize = 2;

fn default_context() -> usize {
    DEFAULT_CONTEXT_LINES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names_match_serde() {
        let kinds = [
            ActionKind::Clear,
            ActionKind::OpenUrl,
            ActionKind::RmRf,
            ActionKind::ToggleMode,
            ActionKind::SetMode,
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_action_result_skips_empty_fields() {
        let result = ActionResult::new(ActionKind::Navigate).with_url("/blog");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"action": "navigate", "url": "/blog"}));
    }

    #[test]
    fn test_form_referer_defaults_to_root() {
        let form: CommandForm = serde_json::from_str(r#"{"cmd": "pwd"}"#).unwrap();
        assert_eq!(form.referer, "/");
    }
}
