//! Shared input box for the command palette
//!
//! One buffer serves both modes:
//! - no leading `>`: fuzzy search over site content
//! - leading `>`: terminal, everything after the sentinel is the command line
//!
//! The mode is never stored; it is read off the buffer's first character.
//! Terminal mode adds history recall (up/down) over a capped `History`.

use tui_input::{Input, InputRequest};

/// Leading character that switches the box into terminal mode
pub const SENTINEL: char = '>';

/// Default history cap
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Keys the palette reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
    Tab,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Search,
    Terminal,
}

/// Result of handling a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// No action needed
    None,
    /// Buffer or cursor changed
    Redraw,
    /// Terminal line submitted (sentinel stripped)
    Execute(String),
    /// Enter in search mode
    Open,
    /// Selection movement in search mode
    SelectPrev,
    SelectNext,
    /// Tab completion requested
    Tab,
    /// Escape
    Close,
}

/// Input buffer with sentinel-aware history recall
pub struct LineEditor {
    input: Input,
    history: History,
    /// Steps back from the newest entry while recalling (None = not recalling)
    history_index: Option<usize>,
}

impl LineEditor {
    pub fn new(history_limit: usize) -> Self {
        Self {
            input: Input::default(),
            history: History::new(history_limit),
            history_index: None,
        }
    }

    /// Raw buffer including any sentinel
    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    pub fn mode(&self) -> InputMode {
        if self.input.value().starts_with(SENTINEL) {
            InputMode::Terminal
        } else {
            InputMode::Search
        }
    }

    /// Logical command line (terminal) or query (search)
    pub fn line(&self) -> &str {
        let value = self.input.value();
        value.strip_prefix(SENTINEL).unwrap_or(value)
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    pub fn handle_key(&mut self, key: Key) -> EditorAction {
        match key {
            Key::Char(c) => {
                self.history_index = None;
                self.input.handle(InputRequest::InsertChar(c));
                EditorAction::Redraw
            }
            Key::Backspace => {
                self.history_index = None;
                if self.input.cursor() > 0 {
                    self.input.handle(InputRequest::DeletePrevChar);
                    EditorAction::Redraw
                } else {
                    EditorAction::None
                }
            }
            Key::Delete => {
                self.history_index = None;
                if self.input.cursor() < self.input.value().chars().count() {
                    self.input.handle(InputRequest::DeleteNextChar);
                    EditorAction::Redraw
                } else {
                    EditorAction::None
                }
            }
            Key::Left => {
                self.input.handle(InputRequest::GoToPrevChar);
                EditorAction::Redraw
            }
            Key::Right => {
                self.input.handle(InputRequest::GoToNextChar);
                EditorAction::Redraw
            }
            Key::Home => {
                self.input.handle(InputRequest::GoToStart);
                EditorAction::Redraw
            }
            Key::End => {
                self.input.handle(InputRequest::GoToEnd);
                EditorAction::Redraw
            }
            Key::Up => match self.mode() {
                InputMode::Terminal => {
                    self.history_prev();
                    EditorAction::Redraw
                }
                InputMode::Search => EditorAction::SelectPrev,
            },
            Key::Down => match self.mode() {
                InputMode::Terminal => {
                    self.history_next();
                    EditorAction::Redraw
                }
                InputMode::Search => EditorAction::SelectNext,
            },
            Key::Tab => EditorAction::Tab,
            Key::Enter => match self.mode() {
                InputMode::Terminal => match self.submit() {
                    Some(line) => EditorAction::Execute(line),
                    None => EditorAction::None,
                },
                InputMode::Search => EditorAction::Open,
            },
            Key::Escape => EditorAction::Close,
        }
    }

    /// Take the terminal line, record it, and leave an empty prompt
    fn submit(&mut self) -> Option<String> {
        let line = self.line().trim().to_string();
        if line.is_empty() {
            return None;
        }

        // Not deduplicated: every submission is recorded
        self.history.push(line.clone());
        self.history_index = None;
        self.set_value(&SENTINEL.to_string());

        Some(line)
    }

    /// Recall one step further back
    fn history_prev(&mut self) {
        let len = self.history.len();
        if len == 0 {
            return;
        }

        let index = match self.history_index {
            None => 0,
            Some(i) => (i + 1).min(len - 1),
        };
        self.history_index = Some(index);
        self.recall(index);
    }

    /// Step toward the newest entry
    ///
    /// Past the newest entry the buffer becomes the bare sentinel rather than
    /// fully empty, so the logical line is empty and terminal mode is kept.
    fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.history_index = None;
                self.set_value(&SENTINEL.to_string());
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.recall(i - 1);
            }
        }
    }

    fn recall(&mut self, index: usize) {
        let entries = self.history.entries();
        if let Some(entry) = entries.get(entries.len() - 1 - index) {
            let value = format!("{}{}", SENTINEL, entry);
            self.set_value(&value);
        }
    }

    /// Replace the buffer, cursor at end
    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    /// Replace the logical line, keeping terminal mode
    pub fn set_line(&mut self, line: &str) {
        self.set_value(&format!("{}{}", SENTINEL, line));
    }

    pub fn clear(&mut self) {
        self.input.reset();
        self.history_index = None;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn load_history(&mut self, entries: Vec<String>) {
        self.history.load(entries);
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

/// Command history, oldest first, capped at `max_size`
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    pub fn push(&mut self, entry: String) {
        if entry.trim().is_empty() {
            return;
        }
        self.entries.push(entry);
        if self.entries.len() > self.max_size {
            self.entries.remove(0);
        }
    }

    /// Replace entries, keeping the newest `max_size`
    pub fn load(&mut self, mut entries: Vec<String>) {
        if entries.len() > self.max_size {
            entries.drain(..entries.len() - self.max_size);
        }
        self.entries = entries;
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
