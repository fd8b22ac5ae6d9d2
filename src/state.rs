//! Read-only state shared by every command invocation

use std::sync::Arc;

use crate::config::Profile;
use crate::content::{ContentIndex, ContentSearch};

/// Collaborators and profile handed to commands
///
/// Built once at startup and never mutated; requests only read from it.
#[derive(Clone)]
pub struct Site {
    pub index: Arc<dyn ContentIndex>,
    pub search: Arc<dyn ContentSearch>,
    pub profile: Profile,
}

impl Site {
    pub fn new(
        index: Arc<dyn ContentIndex>,
        search: Arc<dyn ContentSearch>,
        profile: Profile,
    ) -> Self {
        Self {
            index,
            search,
            profile,
        }
    }
}
