//! Tab completion for the terminal palette
//!
//! Provides prefix completions for:
//! - Command names (from the registered command table)
//! - `cd` targets (a fixed set of site sections)

mod commands;
mod targets;

pub use commands::CommandCompleter;
pub use targets::TargetCompleter;

/// A completion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The text to insert
    pub text: String,
}

/// What pressing Tab does to the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing matched
    None,
    /// Exactly one match: the new logical line
    Replace(String),
    /// Several matches to print
    Candidates(Vec<String>),
}

/// Context for a completion request
#[derive(Debug)]
pub struct CompletionContext<'a> {
    /// Logical command line (sentinel stripped)
    pub line: &'a str,
}

impl<'a> CompletionContext<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line }
    }

    /// Partial `cd` target if completing one
    pub fn cd_argument(&self) -> Option<&'a str> {
        self.line.strip_prefix("cd ")
    }
}

/// Compute candidates for the line and decide the outcome
pub fn complete(ctx: &CompletionContext<'_>) -> Outcome {
    let (prefix, candidates) = match ctx.cd_argument() {
        Some(partial) => ("cd ", filter_prefix(TargetCompleter::complete(), partial)),
        None => ("", filter_prefix(CommandCompleter::complete(), ctx.line)),
    };

    match candidates.as_slice() {
        [] => Outcome::None,
        [only] => Outcome::Replace(format!("{}{}", prefix, only.text)),
        many => Outcome::Candidates(many.iter().map(|c| c.text.clone()).collect()),
    }
}

/// Keep candidates whose text starts with the pattern
fn filter_prefix(candidates: Vec<Completion>, pattern: &str) -> Vec<Completion> {
    candidates
        .into_iter()
        .filter(|c| c.text.starts_with(pattern))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(line: &str) -> Outcome {
        complete(&CompletionContext::new(line))
    }

    #[test]
    fn test_single_command_match() {
        assert_eq!(run("neo"), Outcome::Replace("neofetch".to_string()));
    }

    #[test]
    fn test_multiple_command_matches() {
        assert_eq!(
            run("c"),
            Outcome::Candidates(vec![
                "cat".to_string(),
                "cd".to_string(),
                "clear".to_string(),
                "confetti".to_string(),
                "contact".to_string(),
            ])
        );
    }

    #[test]
    fn test_cd_target_keeps_prefix() {
        assert_eq!(run("cd po"), Outcome::Replace("cd portfolio".to_string()));
        assert_eq!(run("cd zzz"), Outcome::None);
    }

    #[test]
    fn test_cd_without_partial_lists_targets() {
        let Outcome::Candidates(all) = run("cd ") else {
            panic!("expected candidates");
        };
        assert!(all.contains(&"blog".to_string()));
        assert!(all.contains(&"home".to_string()));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(run("qq"), Outcome::None);
    }
}
