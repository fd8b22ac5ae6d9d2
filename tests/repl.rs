//! REPL session driven against a live server over HTTP

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use siteterm::commands::ColorMode;
use siteterm::config::Profile;
use siteterm::content::{ContentMeta, FsContent};
use siteterm::dispatch::Dispatcher;
use siteterm::line_editor::{InputMode, Key};
use siteterm::protocol::CommandResponse;
use siteterm::server;
use siteterm::session::{HostEffect, Session};
use siteterm::state::Site;
use siteterm::store::{MemoryStore, SessionStore};
use siteterm::transport::{HttpTransport, Transport, TransportError};
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn spawn_server() -> (TempDir, String) {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("blog")).unwrap();
    std::fs::write(
        tmp.path().join("blog/hello.md"),
        "---\ntitle: Hello World\ndate: 2024-05-01\ntags: [intro]\n---\nFirst post.\n",
    )
    .unwrap();

    let content = Arc::new(FsContent::load(tmp.path()).unwrap());
    let site = Site::new(content.clone(), content, Profile::default());
    let app = server::router(Arc::new(Dispatcher::new(site)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (tmp, format!("http://{}", addr))
}

/// Feed keys and resolve every effect through the transport, like a host page would
async fn drive(session: &mut Session, transport: &dyn Transport, keys: &[Key]) -> Vec<HostEffect> {
    let mut seen = Vec::new();
    for key in keys {
        let mut queue = session.handle_key(*key);
        while !queue.is_empty() {
            let effect = queue.remove(0);
            match &effect {
                HostEffect::Submit(pending) => {
                    let result = transport.run_command(&pending.line, &pending.referer).await;
                    queue.extend(session.complete(pending.clone(), result));
                }
                HostEffect::LoadIndex => {
                    session.set_index(transport.load_index().await.unwrap());
                }
                _ => {}
            }
            seen.push(effect);
        }
    }
    seen
}

fn typed(line: &str) -> Vec<Key> {
    let mut keys: Vec<Key> = line.chars().map(Key::Char).collect();
    keys.push(Key::Enter);
    keys
}

fn last_entry(session: &Session) -> String {
    session.scrollback().last().map(|e| e.html.clone()).unwrap_or_default()
}

#[tokio::test]
async fn test_terminal_round_trip() {
    let (_tmp, base) = spawn_server().await;
    let transport = HttpTransport::new(base, Some(Duration::from_secs(5))).unwrap();
    let store = Arc::new(MemoryStore::new());
    let mut session = Session::new(store.clone(), 100);

    let opened = session.open();
    assert_eq!(opened, vec![HostEffect::LoadIndex]);
    session.set_index(transport.load_index().await.unwrap());
    assert_eq!(session.results().len(), 1);

    drive(&mut session, &transport, &typed(">pwd")).await;
    assert_eq!(session.mode(), InputMode::Terminal);
    assert_eq!(last_entry(&session), "<pre class='ignore'>&gt; pwd\n/</pre>");

    drive(&mut session, &transport, &typed("ls")).await;
    assert!(last_entry(&session).contains("blog/"));

    assert_eq!(store.load().unwrap().history, vec!["pwd", "ls"]);
}

#[tokio::test]
async fn test_navigation_closes_palette() {
    let (_tmp, base) = spawn_server().await;
    let transport = HttpTransport::new(base, None).unwrap();
    let mut session = Session::new(Arc::new(MemoryStore::new()), 100);
    session.open();
    session.set_location("/blog/hello");

    let effects = drive(&mut session, &transport, &typed(">cd ..")).await;
    assert!(effects.contains(&HostEffect::Navigate("/blog".to_string())));
    assert!(effects.contains(&HostEffect::Close));
    assert!(!session.is_open());
    assert_eq!(session.location(), "/blog");
}

#[tokio::test]
async fn test_mode_and_clear_actions() {
    let (_tmp, base) = spawn_server().await;
    let transport = HttpTransport::new(base, None).unwrap();
    let store = Arc::new(MemoryStore::new());
    let mut session = Session::new(store.clone(), 100);
    session.open();

    let effects = drive(&mut session, &transport, &typed(">mode light")).await;
    assert!(effects.contains(&HostEffect::SetMode(ColorMode::Light)));
    assert_eq!(store.load().unwrap().preferences.mode, Some(ColorMode::Light));

    drive(&mut session, &transport, &typed("clear")).await;
    assert!(session.scrollback().is_empty());
}

#[tokio::test]
async fn test_search_mode_opens_result() {
    let (_tmp, base) = spawn_server().await;
    let transport = HttpTransport::new(base, None).unwrap();
    let mut session = Session::new(Arc::new(MemoryStore::new()), 100);
    session.set_index(transport.load_index().await.unwrap());
    session.open();

    let mut keys: Vec<Key> = "hello".chars().map(Key::Char).collect();
    keys.push(Key::Enter);
    let effects = drive(&mut session, &transport, &keys).await;
    assert_eq!(
        effects,
        vec![HostEffect::Navigate("/blog/hello".to_string()), HostEffect::Close]
    );
}

struct DownTransport;

#[async_trait]
impl Transport for DownTransport {
    async fn run_command(&self, _line: &str, _referer: &str) -> Result<CommandResponse, TransportError> {
        Err(TransportError::Timeout)
    }

    async fn load_index(&self) -> Result<Vec<ContentMeta>, TransportError> {
        Err(TransportError::Status(503))
    }
}

#[tokio::test]
async fn test_unreachable_server_leaves_loop_usable() {
    let mut session = Session::new(Arc::new(MemoryStore::new()), 100);
    session.open();

    drive(&mut session, &DownTransport, &typed(">whoami")).await;
    assert!(last_entry(&session).contains("request timed out"));
    assert!(!session.is_pending());

    let effects = drive(&mut session, &DownTransport, &typed("pwd")).await;
    assert!(matches!(effects.first(), Some(HostEffect::Submit(_))));
}
