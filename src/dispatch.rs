//! Command line dispatcher
//!
//! Stateless: each call is parsed and executed from the raw line and the
//! referer alone. Pipes only support `grep` as a filter stage over the
//! text of a message; actions can't be piped.

use tracing::{debug, field, instrument, Span};

use crate::commands::{CommandOutput, CommandTable, Invocation};
use crate::html;
use crate::protocol::CommandResponse;
use crate::state::Site;

pub struct Dispatcher {
    site: Site,
    table: &'static CommandTable,
}

impl Dispatcher {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            table: CommandTable::builtin(),
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Parse and run one raw command line
    #[instrument(
        name = "cmd.dispatch",
        skip(self, raw),
        fields(command = field::Empty, segments = field::Empty)
    )]
    pub async fn dispatch(&self, raw: &str, referer: &str) -> CommandResponse {
        let line = html::sanitize_input(raw);
        let segments = split_segments(&line);
        Span::current().record("segments", segments.len());

        let Some((first, stages)) = segments.split_first() else {
            return CommandResponse::Html(String::new());
        };

        let args: Vec<String> = first.split_whitespace().map(String::from).collect();
        let name = args.first().cloned().unwrap_or_default();
        Span::current().record("command", name.as_str());

        let inv = Invocation::new(&args, referer, &self.site);
        let body = match self.table.execute(&inv).await {
            CommandOutput::Action(action) if stages.is_empty() => {
                debug!(action = action.action.as_str(), "action result");
                return CommandResponse::Action(action);
            }
            CommandOutput::Action(_) => html::error(&format!(
                "{}: pipes are not supported for commands that trigger actions",
                name
            )),
            CommandOutput::Message(message) => apply_pipes(message, stages),
        };

        CommandResponse::Html(html::transcript(&line, &body))
    }
}

/// `|`-separated segments, trimmed, empties dropped
fn split_segments(line: &str) -> Vec<&str> {
    line.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn unquote(term: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = term
            .strip_prefix(quote)
            .and_then(|t| t.strip_suffix(quote))
        {
            return inner;
        }
    }
    term
}

/// Run filter stages over the text of a message
fn apply_pipes(message: String, stages: &[&str]) -> String {
    let mut current = message;

    for stage in stages {
        let args: Vec<&str> = stage.split_whitespace().collect();
        match args.split_first() {
            Some((&"grep", rest)) => {
                let joined = rest.join(" ");
                let needle = unquote(&joined).to_lowercase();
                let text = html::to_plain(&current);
                let kept: Vec<String> = text
                    .lines()
                    .filter(|line| line.to_lowercase().contains(&needle))
                    .map(html::escape)
                    .collect();

                current = if kept.is_empty() {
                    html::dim("grep: no matches")
                } else {
                    kept.join("\n")
                };
            }
            Some((name, _)) => {
                current = html::error(&format!("{}: not supported in pipe", name));
                break;
            }
            None => {}
        }
    }

    current
}
