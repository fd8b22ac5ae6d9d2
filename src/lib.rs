//! siteterm - terminal-style command palette for a personal site
//!
//! Two halves share this crate:
//! - the stateless dispatcher behind `POST /api/commands` (`dispatch`, `commands`, `server`)
//! - the client-side REPL interpreter that drives the palette (`session`, `line_editor`,
//!   `completion`, `fuzzy`, `store`, `transport`)
//!
//! The server binary is in `main.rs`, a line-driven REPL client in `bin/siteterm-repl.rs`.

pub mod commands;
pub mod completion;
pub mod config;
pub mod content;
pub mod dispatch;
pub mod fuzzy;
pub mod html;
pub mod line_editor;
pub mod paths;
pub mod protocol;
pub mod server;
pub mod session;
pub mod state;
pub mod store;
pub mod transport;
