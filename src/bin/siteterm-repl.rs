//! Line-driven client for the site's command palette
//!
//! Reads lines from stdin and feeds them to a REPL session as keystrokes,
//! talking to a running siteterm server. Host effects are printed in brackets.
//!
//! Usage:
//!   siteterm-repl --endpoint http://127.0.0.1:3000
//!   echo "ls blog" | siteterm-repl --at /blog
//!
//! Plain lines run as terminal commands and `?query` searches content.
//! `:tab <partial>` completes a command; `:up`, `:down`, `:tab`, `:enter`
//! and `:esc` send single keys.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use siteterm::config::Config;
use siteterm::html;
use siteterm::line_editor::{InputMode, Key, SENTINEL};
use siteterm::paths;
use siteterm::session::{HostEffect, Session};
use siteterm::store::{FileStore, MemoryStore, SessionStore};
use siteterm::transport::{HttpTransport, Transport};

#[derive(Default)]
struct Args {
    endpoint: Option<String>,
    location: Option<String>,
    store: Option<String>,
    ephemeral: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--endpoint" | "-e" => {
                args.endpoint = Some(iter.next().ok_or_else(|| anyhow::anyhow!("--endpoint requires value"))?);
            }
            "--at" | "-p" => {
                args.location = Some(iter.next().ok_or_else(|| anyhow::anyhow!("--at requires value"))?);
            }
            "--store" | "-s" => {
                args.store = Some(iter.next().ok_or_else(|| anyhow::anyhow!("--store requires value"))?);
            }
            "--ephemeral" => {
                args.ephemeral = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {}", other);
                print_help();
                std::process::exit(1);
            }
        }
    }

    Ok(args)
}

fn print_help() {
    eprintln!(
        r#"siteterm-repl - terminal palette client for siteterm

USAGE:
    siteterm-repl [OPTIONS]

OPTIONS:
    -e, --endpoint <URL>   Server base URL [default: from config]
    -p, --at <PATH>        Starting page path [default: /]
    -s, --store <PATH>     Session file [default: $SITETERM_HISTORY or data dir]
        --ephemeral        Keep history in memory only
    -h, --help             Print help

INPUT:
    <command>              Run a terminal command
    ?<query>               Search content
    :tab <partial>         Complete a partial command
    :up :down :tab         Send a single key
    :enter :esc
"#
    );
}

/// Keys that empty the buffer
fn erase(buffer: &str) -> Vec<Key> {
    let mut keys = vec![Key::End];
    keys.extend(buffer.chars().map(|_| Key::Backspace));
    keys
}

/// Translate one stdin line into keystrokes
fn keys_for(line: &str, buffer: &str) -> Vec<Key> {
    match line {
        ":up" => return vec![Key::Up],
        ":down" => return vec![Key::Down],
        ":tab" => return vec![Key::Tab],
        ":enter" => return vec![Key::Enter],
        ":esc" => return vec![Key::Escape],
        _ => {}
    }

    if let Some(query) = line.strip_prefix('?') {
        let mut keys = erase(buffer);
        keys.extend(query.chars().map(Key::Char));
        return keys;
    }

    // `:tab <partial>` types a partial command and completes it
    let (text, submit) = match line.strip_prefix(":tab ") {
        Some(partial) => (partial, Key::Tab),
        None => (line, Key::Enter),
    };

    let mut keys = match buffer.strip_prefix(SENTINEL) {
        Some(rest) => erase(rest),
        None => {
            let mut keys = erase(buffer);
            keys.push(Key::Char(SENTINEL));
            keys
        }
    };
    keys.extend(text.chars().map(Key::Char));
    keys.push(submit);
    keys
}

struct Host {
    session: Session,
    transport: Arc<dyn Transport>,
    printed: u64,
}

impl Host {
    /// Apply effects until the queue drains, feeding responses back in
    async fn run(&mut self, effects: Vec<HostEffect>) {
        let mut queue: VecDeque<HostEffect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                HostEffect::LoadIndex => match self.transport.load_index().await {
                    Ok(items) => self.session.set_index(items),
                    Err(e) => {
                        eprintln!("[index unavailable: {}]", e);
                        self.session.index_failed();
                    }
                },
                HostEffect::Submit(pending) => {
                    let result = self
                        .transport
                        .run_command(&pending.line, &pending.referer)
                        .await;
                    queue.extend(self.session.complete(pending, result));
                }
                HostEffect::Focus(mode) => println!("[focus {:?}]", mode),
                HostEffect::Navigate(url) => {
                    println!("[navigate {}]", url);
                    self.session.set_location(url);
                }
                HostEffect::OpenUrl(url) => println!("[open {}]", url),
                HostEffect::SetTheme(theme) => println!("[theme {}]", theme),
                HostEffect::SetMode(mode) => println!("[mode {}]", mode.as_str()),
                HostEffect::SetParticles(level) => println!("[particles {}]", level.as_str()),
                HostEffect::Overlay { kind, duration } => {
                    println!("[{} for {}s]", kind.as_str(), duration.as_secs());
                    // No animation to wait for here
                    self.session.dismiss_overlay();
                }
                HostEffect::DismissOverlay => {}
                HostEffect::Close => {
                    println!("[close]");
                    queue.extend(self.session.open());
                }
            }
            self.flush();
        }
        self.flush();
    }

    fn flush(&mut self) {
        for entry in self.session.scrollback() {
            if entry.id >= self.printed {
                println!("{}", html::to_plain(&entry.html));
                self.printed = entry.id + 1;
            }
        }
        if self.session.mode() == InputMode::Search {
            for (i, item) in self.session.results().iter().enumerate() {
                let marker = if i == self.session.selected() { '*' } else { ' ' };
                println!(" {} {} ({})", marker, item.title, item.url());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("siteterm=warn".parse()?),
        )
        .init();

    let args = parse_args()?;
    let config = Config::from_env()?;

    let endpoint = args.endpoint.unwrap_or(config.repl.endpoint);
    let timeout = match config.repl.request_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let transport = HttpTransport::new(endpoint.clone(), timeout)?;

    let store: Arc<dyn SessionStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let path = args
            .store
            .map(std::path::PathBuf::from)
            .unwrap_or_else(paths::session_store_path);
        paths::ensure_parent(&path)?;
        Arc::new(FileStore::new(path))
    };

    let mut session = Session::new(store, config.repl.history_limit);
    if let Some(location) = args.location {
        session.set_location(location);
    }

    eprintln!("connected to {}", endpoint);

    let mut host = Host {
        session,
        transport: Arc::new(transport),
        printed: 0,
    };
    let effects = host.session.open();
    host.run(effects).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let keys = keys_for(line, host.session.input());
        for key in keys {
            let effects = host.session.handle_key(key);
            host.run(effects).await;
        }
        if line.starts_with(":tab") {
            println!("{}", host.session.input());
        }
    }

    Ok(())
}
