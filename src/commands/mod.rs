//! Command table and handlers
//!
//! Every command is a function of `(args, referer)` plus the read-only
//! collaborators in [`Site`]. The table is built once and never mutated.

mod ascii;
mod files;
mod grep;
mod misc;
mod nav;
mod prefs;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use futures::future::BoxFuture;

use crate::html;
use crate::protocol::{ActionKind, ActionResult};
use crate::state::Site;

pub use ascii::{render_ascii, MAX_ASCII_LEN};
pub use nav::{resolve_cd, CD_TARGETS, SECTIONS};
pub use prefs::{resolve_theme, ColorMode, ParticleLevel, Theme, THEMES};

/// Arguments and context for one command execution
pub struct Invocation<'a> {
    /// Tokenized segment; `args[0]` is the command name
    pub args: &'a [String],
    /// Caller's current logical path
    pub referer: &'a str,
    pub site: &'a Site,
}

impl<'a> Invocation<'a> {
    pub fn new(args: &'a [String], referer: &'a str, site: &'a Site) -> Self {
        Self {
            args,
            referer,
            site,
        }
    }

    /// Command name
    pub fn name(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    /// Positional argument after the command name (0-based)
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index + 1).map(String::as_str)
    }

    /// Arguments after the command name
    pub fn rest(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }
}

/// What a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Client directive
    Action(ActionResult),
    /// HTML for display
    Message(String),
}

impl CommandOutput {
    pub fn message(html: impl Into<String>) -> Self {
        CommandOutput::Message(html.into())
    }

    /// Error-styled message; `text` is escaped
    pub fn error(text: &str) -> Self {
        CommandOutput::Message(html::error(text))
    }

    pub fn action(kind: ActionKind) -> Self {
        CommandOutput::Action(ActionResult::new(kind))
    }

    pub fn is_action(&self) -> bool {
        matches!(self, CommandOutput::Action(_))
    }
}

impl From<ActionResult> for CommandOutput {
    fn from(action: ActionResult) -> Self {
        CommandOutput::Action(action)
    }
}

pub type SyncHandler = fn(&Invocation<'_>) -> CommandOutput;
pub type AsyncHandler = for<'a> fn(&'a Invocation<'a>) -> BoxFuture<'a, CommandOutput>;

/// Handler entry; only commands that call a collaborator asynchronously are `Async`
#[derive(Clone, Copy)]
pub enum Handler {
    Sync(SyncHandler),
    Async(AsyncHandler),
}

/// Help descriptor shown by `help` and `help <cmd>`
#[derive(Debug, Clone, Copy)]
pub struct Help {
    pub usage: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub help: Help,
    pub handler: Handler,
}

/// Immutable mapping from command name to handler
pub struct CommandTable {
    commands: BTreeMap<&'static str, CommandSpec>,
}

impl CommandTable {
    /// Process-wide table, built on first use
    pub fn builtin() -> &'static CommandTable {
        static TABLE: OnceLock<CommandTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    fn build() -> Self {
        let specs = [
            spec("help", "help [command]", "List commands or describe one", &["help", "help grep"], Handler::Sync(cmd_help)),
            spec("cd", "cd [path]", "Change directory (navigate the site)", &["cd blog", "cd ..", "cd ~"], Handler::Sync(nav::cd)),
            spec("ls", "ls", "List site sections", &[], Handler::Sync(nav::ls)),
            spec("pwd", "pwd", "Print current location", &[], Handler::Sync(nav::pwd)),
            spec("tree", "tree", "Show the site as a directory tree", &[], Handler::Sync(nav::tree)),
            spec("cat", "cat <slug>", "Print the first lines of a post", &["cat about"], Handler::Sync(files::cat)),
            spec("man", "man <slug>", "Show metadata for a post", &["man hello-world"], Handler::Sync(files::man)),
            spec("grep", "grep [-C n] [-b] <term>", "Search titles and tags, or bodies with -b", &["grep rust", "grep -b redis", "grep -C 1 -b redis"], Handler::Async(grep::grep)),
            spec("ascii", "ascii <text>", "Render text as block letters (max 12 chars)", &["ascii hello"], Handler::Sync(ascii::ascii)),
            spec("theme", "theme [name]", "List themes or switch theme", &["theme", "theme dracula"], Handler::Sync(prefs::theme)),
            spec("particles", "particles [off|low|medium|high]", "Set background particle density", &["particles low"], Handler::Sync(prefs::particles)),
            spec("mode", "mode [light|dark]", "Toggle or set colour mode", &["mode", "mode dark"], Handler::Sync(prefs::mode)),
            spec("whoami", "whoami", "About the site owner", &[], Handler::Sync(misc::whoami)),
            spec("contact", "contact", "How to get in touch", &[], Handler::Sync(misc::contact)),
            spec("echo", "echo <message>", "Print a message", &["echo hello"], Handler::Sync(misc::echo)),
            spec("neofetch", "neofetch", "System information", &[], Handler::Sync(misc::neofetch)),
            spec("clear", "clear", "Clear the terminal", &[], Handler::Sync(misc::clear)),
            spec("history", "history", "Show command history", &[], Handler::Sync(misc::history)),
            spec("github", "github", "Open GitHub profile", &[], Handler::Sync(misc::github)),
            spec("x", "x", "Open X profile", &[], Handler::Sync(misc::x)),
            spec("matrix", "matrix", "Enter the matrix", &[], Handler::Sync(misc::matrix)),
            spec("fireworks", "fireworks", "Celebrate", &[], Handler::Sync(misc::fireworks)),
            spec("confetti", "confetti", "Throw confetti", &[], Handler::Sync(misc::confetti)),
            spec("rain", "rain", "Make it rain", &[], Handler::Sync(misc::rain)),
            spec("rotate", "rotate", "Do a barrel roll", &[], Handler::Sync(misc::rotate)),
            spec("hack", "hack", "Definitely not malware", &[], Handler::Sync(misc::hack)),
            spec("rm", "rm [-rf] <path>", "Remove files (don't)", &["rm -rf /"], Handler::Sync(misc::rm)),
            spec("sudo", "sudo <command>", "Run as superuser", &["sudo rm -rf /"], Handler::Sync(misc::sudo)),
        ];

        Self {
            commands: specs.into_iter().map(|s| (s.name, s)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Registered command names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.values()
    }

    /// Run the command named by `args[0]`
    pub async fn execute(&self, inv: &Invocation<'_>) -> CommandOutput {
        match self.get(inv.name()).map(|s| s.handler) {
            Some(Handler::Sync(handler)) => handler(inv),
            Some(Handler::Async(handler)) => handler(inv).await,
            None => CommandOutput::error(&format!("command not found: {}", inv.name())),
        }
    }
}

fn spec(
    name: &'static str,
    usage: &'static str,
    description: &'static str,
    examples: &'static [&'static str],
    handler: Handler,
) -> CommandSpec {
    CommandSpec {
        name,
        help: Help {
            usage,
            description,
            examples,
        },
        handler,
    }
}

fn cmd_help(inv: &Invocation<'_>) -> CommandOutput {
    let table = CommandTable::builtin();

    let Some(target) = inv.arg(0) else {
        let mut out = String::from("<div class='grid'>");
        for spec in table.specs() {
            out.push_str(&format!(
                "{}{}  {}\n",
                html::command(spec.name),
                " ".repeat(12usize.saturating_sub(spec.name.len())),
                html::escape(spec.help.description)
            ));
        }
        out.push_str("</div>");
        out.push_str(&html::dim("Type 'help <command>' for details."));
        return CommandOutput::message(out);
    };

    match table.get(target) {
        Some(spec) => {
            let mut out = format!(
                "Usage: {}\n{}",
                html::command(spec.help.usage),
                html::escape(spec.help.description)
            );
            if !spec.help.examples.is_empty() {
                out.push_str("\n\nExamples:");
                for example in spec.help.examples {
                    out.push_str(&format!("\n  {}", html::escape(example)));
                }
            }
            CommandOutput::message(out)
        }
        None => CommandOutput::error(&format!("help: no help for '{}'", target)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixture collaborators for command tests

    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::config::Profile;
    use crate::content::{
        ContentError, ContentIndex, ContentMeta, ContentSearch, LineMatch, SearchHit, Section,
    };
    use crate::state::Site;

    pub struct FixtureIndex;

    fn meta(slug: &str, title: &str, dir: &str, tags: &[&str], day: u32) -> ContentMeta {
        ContentMeta {
            slug: slug.to_string(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            directory: dir.to_string(),
            description: None,
        }
    }

    impl ContentIndex for FixtureIndex {
        fn list(&self, section: Section) -> Vec<ContentMeta> {
            match section {
                Section::Blog => vec![
                    meta("redis-cache", "Caching with Redis", "blog", &["redis", "db"], 3),
                    meta("rust-async", "Async Rust", "blog", &["rust"], 2),
                ],
                Section::Portfolio => vec![meta("palette", "Command Palette", "portfolio", &["ui"], 1)],
                Section::Til => vec![],
            }
        }

        fn read_source(&self, slug: &str) -> Result<Option<String>, ContentError> {
            Ok(match slug {
                "about" => Some("---\ntitle: About\n---\n\nline one\n\nline <two>\nthree\nfour\nfive\nsix\n".to_string()),
                "plain" => Some("a\nb\n".to_string()),
                _ => None,
            })
        }
    }

    pub struct FixtureSearch {
        pub fail: bool,
    }

    #[async_trait]
    impl ContentSearch for FixtureSearch {
        async fn search(&self, term: &str, context: usize) -> Result<Vec<SearchHit>, ContentError> {
            if self.fail {
                return Err(ContentError::Unavailable("down".to_string()));
            }
            if term != "redis" {
                return Ok(vec![]);
            }
            let ctx = context.min(1);
            Ok(vec![SearchHit {
                slug: "redis-cache".to_string(),
                kind: Section::Blog,
                title: "Caching with Redis".to_string(),
                matches: vec![LineMatch {
                    line_number: 4,
                    content: "use redis for caching".to_string(),
                    before: vec!["before line".to_string()][..ctx].to_vec(),
                    after: vec!["after line".to_string()][..ctx].to_vec(),
                }],
            }])
        }
    }

    pub fn site() -> Site {
        Site::new(
            Arc::new(FixtureIndex),
            Arc::new(FixtureSearch { fail: false }),
            Profile::default(),
        )
    }

    pub fn failing_site() -> Site {
        Site::new(
            Arc::new(FixtureIndex),
            Arc::new(FixtureSearch { fail: true }),
            Profile::default(),
        )
    }

    pub fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }
}
