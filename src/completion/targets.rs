//! `cd` target completion

use super::Completion;
use crate::commands::CD_TARGETS;

pub struct TargetCompleter;

impl TargetCompleter {
    pub fn complete() -> Vec<Completion> {
        CD_TARGETS
            .iter()
            .map(|target| Completion {
                text: target.to_string(),
            })
            .collect()
    }
}
