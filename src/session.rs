//! REPL interpreter state for the command palette
//!
//! The session is a plain state object with transition functions:
//! - `handle_key` for keystrokes
//! - `complete` for transport results
//! - `open` / `close` for widget visibility
//!
//! Each returns the `HostEffect`s the embedding page must apply (navigation,
//! theme changes, overlays). Nothing here touches a view layer or the network.
//!
//! One command is in flight at a time: Enter is ignored while a request is
//! pending. Responses that arrive after the widget closed are discarded.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::commands::{ColorMode, ParticleLevel};
use crate::completion::{self, CompletionContext, Outcome};
use crate::content::ContentMeta;
use crate::fuzzy::FuzzyIndex;
use crate::html;
use crate::line_editor::{EditorAction, InputMode, Key, LineEditor};
use crate::protocol::{ActionKind, ActionResult, CommandResponse};
use crate::store::{Preferences, SessionStore, StoredSession};
use crate::transport::TransportError;

const MOTD: &str = "Welcome! Type 'help' to list commands, 'tree' to look around.";

/// One rendered block of terminal output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollbackEntry {
    pub id: u64,
    pub html: String,
}

/// Ticket for a submitted command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    pub id: u64,
    generation: u64,
    pub line: String,
    pub referer: String,
}

/// Side effects the host page must apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEffect {
    /// Fetch the content index for search mode
    LoadIndex,
    /// Send this line to the dispatcher, then call `Session::complete`
    Submit(PendingCommand),
    /// Mode switched; focus the matching input
    Focus(InputMode),
    Navigate(String),
    OpenUrl(String),
    SetTheme(String),
    SetMode(ColorMode),
    SetParticles(ParticleLevel),
    /// Full-screen cosmetic effect; dismissed after `duration` or on the next key
    Overlay { kind: ActionKind, duration: Duration },
    DismissOverlay,
    /// Hide the widget
    Close,
}

/// How long a cosmetic overlay stays up
pub fn overlay_duration(kind: ActionKind) -> Duration {
    match kind {
        ActionKind::Rotate => Duration::from_secs(2),
        ActionKind::Confetti => Duration::from_secs(4),
        ActionKind::Fireworks => Duration::from_secs(5),
        ActionKind::RmRf | ActionKind::Malware => Duration::from_secs(6),
        ActionKind::Matrix | ActionKind::Rain => Duration::from_secs(10),
        _ => Duration::ZERO,
    }
}

pub struct Session {
    editor: LineEditor,
    scrollback: Vec<ScrollbackEntry>,
    next_entry_id: u64,
    open: bool,
    /// Bumped on every close so late responses can be recognized
    generation: u64,
    pending: Option<u64>,
    next_ticket: u64,
    index: Option<FuzzyIndex>,
    index_requested: bool,
    results: Vec<ContentMeta>,
    selected: usize,
    motd_shown: bool,
    overlay: Option<ActionKind>,
    location: String,
    preferences: Preferences,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Start a session, restoring history and preferences from the store
    pub fn new(store: Arc<dyn SessionStore>, history_limit: usize) -> Self {
        let stored = store.load().unwrap_or_else(|e| {
            warn!("failed to load session store: {}", e);
            StoredSession::default()
        });

        let mut editor = LineEditor::new(history_limit);
        editor.load_history(stored.history);

        Self {
            editor,
            scrollback: Vec::new(),
            next_entry_id: 0,
            open: false,
            generation: 0,
            pending: None,
            next_ticket: 0,
            index: None,
            index_requested: false,
            results: Vec::new(),
            selected: 0,
            motd_shown: false,
            overlay: None,
            location: "/".to_string(),
            preferences: stored.preferences,
            store,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> InputMode {
        self.editor.mode()
    }

    /// Raw input buffer
    pub fn input(&self) -> &str {
        self.editor.value()
    }

    pub fn history(&self) -> &[String] {
        self.editor.history().entries()
    }

    pub fn history_index(&self) -> Option<usize> {
        self.editor.history_index()
    }

    pub fn scrollback(&self) -> &[ScrollbackEntry] {
        &self.scrollback
    }

    pub fn results(&self) -> &[ContentMeta] {
        &self.results
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Host reports the current page path (sent as referer)
    pub fn set_location(&mut self, path: impl Into<String>) {
        self.location = path.into();
    }

    // ------------------------------------------------------------------
    // Widget lifecycle
    // ------------------------------------------------------------------

    pub fn open(&mut self) -> Vec<HostEffect> {
        self.open = true;
        let mut effects = Vec::new();
        if self.index.is_none() && !self.index_requested {
            self.index_requested = true;
            effects.push(HostEffect::LoadIndex);
        }
        self.refresh_results();
        effects
    }

    /// Hide the widget; any in-flight response will be discarded
    pub fn close(&mut self) {
        self.open = false;
        self.generation += 1;
        self.pending = None;
        self.overlay = None;
        self.editor.clear();
        self.selected = 0;
    }

    /// Install the lazily loaded search index
    pub fn set_index(&mut self, items: Vec<ContentMeta>) {
        self.index = Some(FuzzyIndex::new(items));
        self.refresh_results();
    }

    /// Index fetch failed; the next open retries
    pub fn index_failed(&mut self) {
        self.index_requested = false;
    }

    pub fn dismiss_overlay(&mut self) -> bool {
        self.overlay.take().is_some()
    }

    // ------------------------------------------------------------------
    // Keystrokes
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: Key) -> Vec<HostEffect> {
        if self.overlay.take().is_some() {
            return vec![HostEffect::DismissOverlay];
        }
        if !self.open {
            return Vec::new();
        }

        let before_mode = self.editor.mode();
        if key == Key::Enter && before_mode == InputMode::Terminal && self.pending.is_some() {
            debug!("command in flight, ignoring submit");
            return Vec::new();
        }
        let before_value = self.editor.value().to_string();

        let mut effects = Vec::new();
        match self.editor.handle_key(key) {
            EditorAction::None | EditorAction::Redraw => {}
            EditorAction::Execute(line) => effects.push(self.submit(line)),
            EditorAction::Open => {
                if let Some(item) = self.results.get(self.selected) {
                    let url = item.url();
                    self.close();
                    effects.push(HostEffect::Navigate(url));
                    effects.push(HostEffect::Close);
                }
            }
            EditorAction::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
            }
            EditorAction::SelectNext => {
                if !self.results.is_empty() {
                    self.selected = (self.selected + 1).min(self.results.len() - 1);
                }
            }
            EditorAction::Tab => {
                if before_mode == InputMode::Terminal {
                    self.tab_complete();
                }
            }
            EditorAction::Close => {
                self.close();
                effects.push(HostEffect::Close);
            }
        }

        if !self.open {
            return effects;
        }

        let after_mode = self.editor.mode();
        if after_mode != before_mode {
            effects.push(HostEffect::Focus(after_mode));
            if after_mode == InputMode::Terminal && !self.motd_shown {
                self.motd_shown = true;
                self.push_entry(format!("<span class='motd'>{}</span>", html::escape(MOTD)));
            }
        }
        if after_mode == InputMode::Search && self.editor.value() != before_value {
            self.refresh_results();
        }

        effects
    }

    fn submit(&mut self, line: String) -> HostEffect {
        self.persist();

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(id);

        HostEffect::Submit(PendingCommand {
            id,
            generation: self.generation,
            line,
            referer: self.location.clone(),
        })
    }

    fn tab_complete(&mut self) {
        let line = self.editor.line().to_string();
        match completion::complete(&CompletionContext::new(&line)) {
            Outcome::None => {}
            Outcome::Replace(completed) => self.editor.set_line(&completed),
            Outcome::Candidates(candidates) => {
                self.push_entry(html::escape(&candidates.join(" ")));
            }
        }
    }

    fn refresh_results(&mut self) {
        let query = match self.editor.mode() {
            InputMode::Search => self.editor.value().to_string(),
            InputMode::Terminal => return,
        };
        self.results = match self.index.as_mut() {
            Some(index) => index.search(&query),
            None => Vec::new(),
        };
        self.selected = 0;
    }

    // ------------------------------------------------------------------
    // Responses
    // ------------------------------------------------------------------

    /// Apply the outcome of a submitted command
    pub fn complete(
        &mut self,
        pending: PendingCommand,
        result: Result<CommandResponse, TransportError>,
    ) -> Vec<HostEffect> {
        if !self.open || pending.generation != self.generation || self.pending != Some(pending.id) {
            debug!(id = pending.id, "discarding response for closed or stale submission");
            return Vec::new();
        }
        self.pending = None;

        match result {
            Ok(CommandResponse::Html(body)) => {
                if !body.is_empty() {
                    self.push_entry(body);
                }
                Vec::new()
            }
            Ok(CommandResponse::Action(action)) => self.apply_action(action),
            Err(e) => {
                warn!(line = %pending.line, "command request failed: {}", e);
                self.push_entry(html::error(&format!("error: {}", e)));
                Vec::new()
            }
        }
    }

    fn apply_action(&mut self, action: ActionResult) -> Vec<HostEffect> {
        if let Some(message) = &action.message {
            self.push_entry(message.clone());
        }

        match action.action {
            ActionKind::Clear => {
                self.scrollback.clear();
                Vec::new()
            }
            ActionKind::Navigate => match action.url {
                Some(url) => {
                    self.location = url.clone();
                    self.close();
                    vec![HostEffect::Navigate(url), HostEffect::Close]
                }
                None => self.malformed("navigate without url"),
            },
            ActionKind::OpenUrl => match action.url {
                Some(url) => vec![HostEffect::OpenUrl(url)],
                None => self.malformed("open-url without url"),
            },
            ActionKind::Theme => match action.theme {
                Some(theme) => {
                    self.preferences.theme = Some(theme.clone());
                    self.persist();
                    vec![HostEffect::SetTheme(theme)]
                }
                None => self.malformed("theme without name"),
            },
            ActionKind::SetMode => match action.value.as_deref().and_then(ColorMode::parse) {
                Some(mode) => self.set_mode(mode),
                None => self.malformed("set-mode without a valid mode"),
            },
            ActionKind::ToggleMode => {
                let next = self.preferences.mode.unwrap_or(ColorMode::Dark).toggled();
                self.set_mode(next)
            }
            ActionKind::Particles => match action.value.as_deref().and_then(ParticleLevel::parse) {
                Some(level) => {
                    self.preferences.particles = Some(level);
                    self.persist();
                    vec![HostEffect::SetParticles(level)]
                }
                None => self.malformed("particles without a valid level"),
            },
            ActionKind::History => {
                self.push_history_listing();
                Vec::new()
            }
            kind @ (ActionKind::RmRf
            | ActionKind::Malware
            | ActionKind::Matrix
            | ActionKind::Fireworks
            | ActionKind::Confetti
            | ActionKind::Rain
            | ActionKind::Rotate) => {
                self.overlay = Some(kind);
                vec![HostEffect::Overlay {
                    kind,
                    duration: overlay_duration(kind),
                }]
            }
        }
    }

    fn set_mode(&mut self, mode: ColorMode) -> Vec<HostEffect> {
        self.preferences.mode = Some(mode);
        self.persist();
        vec![HostEffect::SetMode(mode)]
    }

    fn malformed(&mut self, what: &str) -> Vec<HostEffect> {
        warn!("malformed action response: {}", what);
        self.push_entry(html::error(&format!("malformed response: {}", what)));
        Vec::new()
    }

    /// The dispatcher holds no history; render the local one
    fn push_history_listing(&mut self) {
        let lines: Vec<String> = self
            .editor
            .history()
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{:>4}  {}", i + 1, html::escape(entry)))
            .collect();
        self.push_entry(format!("<pre class='ignore'>{}</pre>", lines.join("\n")));
    }

    fn push_entry(&mut self, html: String) {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        self.scrollback.push(ScrollbackEntry { id, html });
    }

    fn persist(&self) {
        let snapshot = StoredSession {
            history: self.editor.history().entries().to_vec(),
            preferences: self.preferences.clone(),
        };
        if let Err(e) = self.store.save(&snapshot) {
            warn!("failed to persist session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn session() -> (Session, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let mut session = Session::new(store.clone(), 10);
        session.open();
        (session, store)
    }

    fn type_str(session: &mut Session, s: &str) -> Vec<HostEffect> {
        let mut effects = Vec::new();
        for c in s.chars() {
            effects.extend(session.handle_key(Key::Char(c)));
        }
        effects
    }

    fn submit(session: &mut Session, line: &str) -> PendingCommand {
        if session.mode() == InputMode::Search {
            type_str(session, ">");
        }
        type_str(session, line);
        match session.handle_key(Key::Enter).as_slice() {
            [HostEffect::Submit(p)] => p.clone(),
            other => panic!("expected submit, got {:?}", other),
        }
    }

    fn meta(slug: &str, title: &str) -> ContentMeta {
        ContentMeta {
            slug: slug.to_string(),
            title: title.to_string(),
            date: None,
            tags: vec![],
            directory: "blog".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_first_open_requests_index_once() {
        let store = Arc::new(MemoryStore::new());
        let mut session = Session::new(store, 10);
        assert_eq!(session.open(), vec![HostEffect::LoadIndex]);
        session.close();
        assert!(session.open().is_empty());
    }

    #[test]
    fn test_entering_terminal_shows_motd_once() {
        let (mut session, _) = session();
        let effects = type_str(&mut session, ">");
        assert_eq!(effects, vec![HostEffect::Focus(InputMode::Terminal)]);
        assert_eq!(session.scrollback().len(), 1);

        session.handle_key(Key::Backspace);
        assert_eq!(session.mode(), InputMode::Search);
        type_str(&mut session, ">");
        assert_eq!(session.scrollback().len(), 1);
    }

    #[test]
    fn test_submit_records_history_and_persists() {
        let (mut session, store) = session();
        let pending = submit(&mut session, "ls");
        assert_eq!(pending.line, "ls");
        assert_eq!(pending.referer, "/");
        assert_eq!(session.history(), ["ls"]);
        assert_eq!(store.snapshot().history, vec!["ls"]);
        assert!(session.is_pending());
    }

    #[test]
    fn test_enter_ignored_while_pending() {
        let (mut session, _) = session();
        submit(&mut session, "ls");
        type_str(&mut session, "pwd");
        assert!(session.handle_key(Key::Enter).is_empty());
        assert_eq!(session.input(), ">pwd");
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_html_response_appends_scrollback() {
        let (mut session, _) = session();
        let pending = submit(&mut session, "pwd");
        let before = session.scrollback().len();
        let effects = session.complete(pending, Ok(CommandResponse::Html("<pre>/</pre>".into())));
        assert!(effects.is_empty());
        assert_eq!(session.scrollback().len(), before + 1);
        assert_eq!(session.scrollback().last().unwrap().html, "<pre>/</pre>");
        assert!(!session.is_pending());
    }

    #[test]
    fn test_clear_action_empties_scrollback() {
        let (mut session, _) = session();
        let pending = submit(&mut session, "clear");
        assert!(!session.scrollback().is_empty());
        session.complete(pending, Ok(CommandResponse::Action(ActionResult::new(ActionKind::Clear))));
        assert!(session.scrollback().is_empty());
    }

    #[test]
    fn test_navigate_closes_and_updates_location() {
        let (mut session, _) = session();
        let pending = submit(&mut session, "cd blog");
        let effects = session.complete(
            pending,
            Ok(CommandResponse::Action(
                ActionResult::new(ActionKind::Navigate).with_url("/blog"),
            )),
        );
        assert_eq!(
            effects,
            vec![HostEffect::Navigate("/blog".to_string()), HostEffect::Close]
        );
        assert!(!session.is_open());
        assert_eq!(session.location(), "/blog");
    }

    #[test]
    fn test_theme_action_persists_preference_and_shows_message() {
        let (mut session, store) = session();
        let pending = submit(&mut session, "theme nord");
        let before = session.scrollback().len();
        let effects = session.complete(
            pending,
            Ok(CommandResponse::Action(
                ActionResult::new(ActionKind::Theme)
                    .with_theme("nord")
                    .with_message("Theme set to Nord"),
            )),
        );
        assert_eq!(effects, vec![HostEffect::SetTheme("nord".to_string())]);
        assert_eq!(session.scrollback().len(), before + 1);
        assert_eq!(store.snapshot().preferences.theme.as_deref(), Some("nord"));
    }

    #[test]
    fn test_toggle_mode_flips_stored_mode() {
        let (mut session, _) = session();
        let toggle = || Ok(CommandResponse::Action(ActionResult::new(ActionKind::ToggleMode)));

        let pending = submit(&mut session, "mode");
        assert_eq!(
            session.complete(pending, toggle()),
            vec![HostEffect::SetMode(ColorMode::Light)]
        );
        let pending = submit(&mut session, "mode");
        assert_eq!(
            session.complete(pending, toggle()),
            vec![HostEffect::SetMode(ColorMode::Dark)]
        );
    }

    #[test]
    fn test_overlay_dismissed_by_next_key() {
        let (mut session, _) = session();
        let pending = submit(&mut session, "matrix");
        let effects = session.complete(
            pending,
            Ok(CommandResponse::Action(ActionResult::new(ActionKind::Matrix))),
        );
        assert_eq!(
            effects,
            vec![HostEffect::Overlay {
                kind: ActionKind::Matrix,
                duration: Duration::from_secs(10)
            }]
        );
        assert_eq!(session.handle_key(Key::Char('x')), vec![HostEffect::DismissOverlay]);
        assert_eq!(session.input(), ">");
    }

    #[test]
    fn test_history_action_renders_local_history() {
        let (mut session, _) = session();
        let p = submit(&mut session, "echo <hi>");
        session.complete(p, Ok(CommandResponse::Html(String::new())));
        let p = submit(&mut session, "history");
        session.complete(p, Ok(CommandResponse::Action(ActionResult::new(ActionKind::History))));

        let last = &session.scrollback().last().unwrap().html;
        assert!(last.contains("   1  echo &lt;hi&gt;"));
        assert!(last.contains("   2  history"));
    }

    #[test]
    fn test_transport_error_is_one_entry() {
        let (mut session, _) = session();
        let pending = submit(&mut session, "ls");
        let before = session.scrollback().len();
        session.complete(pending, Err(TransportError::Timeout));
        assert_eq!(session.scrollback().len(), before + 1);
        assert!(session.scrollback().last().unwrap().html.contains("timed out"));
        // Loop remains usable
        submit(&mut session, "pwd");
    }

    #[test]
    fn test_response_after_close_is_discarded() {
        let (mut session, _) = session();
        let pending = submit(&mut session, "ls");
        session.close();
        session.open();
        let before = session.scrollback().len();
        let effects = session.complete(pending, Ok(CommandResponse::Html("late".into())));
        assert!(effects.is_empty());
        assert_eq!(session.scrollback().len(), before);
    }

    #[test]
    fn test_tab_completion() {
        let (mut session, _) = session();
        type_str(&mut session, ">neo");
        session.handle_key(Key::Tab);
        assert_eq!(session.input(), ">neofetch");

        session.close();
        session.open();
        type_str(&mut session, ">cd b");
        session.handle_key(Key::Tab);
        assert_eq!(session.input(), ">cd blog");

        let before = session.scrollback().len();
        session.close();
        session.open();
        type_str(&mut session, ">m");
        session.handle_key(Key::Tab);
        assert_eq!(session.input(), ">m");
        assert_eq!(session.scrollback().len(), before + 1);
        assert_eq!(session.scrollback().last().unwrap().html, "man matrix mode");
    }

    #[test]
    fn test_search_mode_selection_and_open() {
        let (mut session, _) = session();
        session.set_index(vec![meta("a", "Alpha"), meta("b", "Beta")]);
        assert_eq!(session.results().len(), 2);

        session.handle_key(Key::Up);
        assert_eq!(session.selected(), 0);
        session.handle_key(Key::Down);
        session.handle_key(Key::Down);
        assert_eq!(session.selected(), 1);

        let effects = session.handle_key(Key::Enter);
        assert_eq!(
            effects,
            vec![HostEffect::Navigate("/blog/b".to_string()), HostEffect::Close]
        );
        assert!(!session.is_open());
    }

    #[test]
    fn test_search_filters_results() {
        let (mut session, _) = session();
        session.set_index(vec![meta("a", "Alpha"), meta("b", "Beta")]);
        type_str(&mut session, "beta");
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].slug, "b");
    }

    #[test]
    fn test_history_restored_and_capped() {
        let store = Arc::new(MemoryStore::with(StoredSession {
            history: (0..15).map(|i| format!("cmd{}", i)).collect(),
            preferences: Preferences::default(),
        }));
        let mut session = Session::new(store, 10);
        session.open();
        assert_eq!(session.history().len(), 10);
        assert_eq!(session.history()[0], "cmd5");

        for _ in 0..3 {
            submit(&mut session, "x");
            session.pending = None;
        }
        assert_eq!(session.history().len(), 10);
        assert_eq!(session.history()[9], "x");
    }
}
