//! Command name completion from the registered table

use super::Completion;
use crate::commands::CommandTable;

pub struct CommandCompleter;

impl CommandCompleter {
    /// Get all command completions, sorted by name
    pub fn complete() -> Vec<Completion> {
        CommandTable::builtin()
            .specs()
            .map(|spec| Completion {
                text: spec.name.to_string(),
            })
            .collect()
    }
}
