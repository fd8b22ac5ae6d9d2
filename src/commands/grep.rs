//! grep: title/tag search, or full-body search with `-b`

use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::{CommandOutput, Invocation};
use crate::content::{ContentMeta, SearchHit};
use crate::html;
use crate::protocol::DEFAULT_CONTEXT_LINES;

/// Hits rendered per document before the "more matches" footer
const MAX_HITS_PER_DOC: usize = 3;

const USAGE: &str = "usage: grep [-C n] [-b] <term>";

#[derive(Debug, PartialEq, Eq)]
struct GrepArgs {
    context: usize,
    body: bool,
    term: String,
}

fn parse_args(rest: &[String]) -> Result<GrepArgs, String> {
    let mut context = DEFAULT_CONTEXT_LINES;
    let mut body = false;
    let mut words = Vec::new();

    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-b" => body = true,
            "-C" => {
                context = iter
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| "grep: option requires a numeric argument -- 'C'".to_string())?;
            }
            word => words.push(word),
        }
    }

    let term = words.join(" ");
    if term.is_empty() {
        return Err(USAGE.to_string());
    }

    Ok(GrepArgs { context, body, term })
}

pub(super) fn grep<'a>(inv: &'a Invocation<'a>) -> BoxFuture<'a, CommandOutput> {
    Box::pin(run(inv))
}

async fn run(inv: &Invocation<'_>) -> CommandOutput {
    let args = match parse_args(inv.rest()) {
        Ok(args) => args,
        Err(usage) => return CommandOutput::error(&usage),
    };

    if !args.body {
        return grep_titles(inv, &args.term);
    }

    match inv.site.search.search(&args.term, args.context).await {
        Ok(hits) => {
            debug!(term = %args.term, docs = hits.len(), "body grep");
            render_body_hits(&args.term, &hits)
        }
        Err(e) => {
            warn!(term = %args.term, "content search failed: {}", e);
            CommandOutput::error("grep: failed to search content")
        }
    }
}

fn title_matches(item: &ContentMeta, needle: &str) -> bool {
    item.title.to_lowercase().contains(needle)
        || item.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn grep_titles(inv: &Invocation<'_>, term: &str) -> CommandOutput {
    let needle = term.to_lowercase();
    let lines: Vec<String> = inv
        .site
        .index
        .all()
        .into_iter()
        .filter(|item| title_matches(item, &needle))
        .map(|item| {
            let mut line = format!(
                "{}  {}",
                html::path(&format!("{}/{}", item.directory, item.slug)),
                html::escape(&item.title)
            );
            if !item.tags.is_empty() {
                line.push_str(&format!("  {}", html::dim(&format!("[{}]", item.tags.join(", ")))));
            }
            line
        })
        .collect();

    if lines.is_empty() {
        return CommandOutput::message(html::dim(&format!("grep: no matches for '{}'", term)));
    }
    CommandOutput::message(lines.join("\n"))
}

fn render_body_hits(term: &str, hits: &[SearchHit]) -> CommandOutput {
    if hits.is_empty() {
        return CommandOutput::message(html::dim(&format!("grep: no matches for '{}'", term)));
    }

    let mut blocks = Vec::new();
    for hit in hits {
        let mut block = format!(
            "{}  {}",
            html::path(&format!("{}/{}", hit.kind.as_str(), hit.slug)),
            html::dim(&hit.title)
        );

        for m in hit.matches.iter().take(MAX_HITS_PER_DOC) {
            let first = m.line_number.saturating_sub(m.before.len());
            for (i, line) in m.before.iter().enumerate() {
                block.push_str(&format!("\n  {}", html::dim(&format!("{}-{}", first + i, line))));
            }
            block.push_str(&format!("\n  {}", html::hit(&format!("{}:{}", m.line_number, m.content))));
            for (i, line) in m.after.iter().enumerate() {
                block.push_str(&format!(
                    "\n  {}",
                    html::dim(&format!("{}-{}", m.line_number + 1 + i, line))
                ));
            }
        }

        let hidden = hit.matches.len().saturating_sub(MAX_HITS_PER_DOC);
        if hidden > 0 {
            block.push_str(&format!("\n  {}", html::dim(&format!("... {} more matches", hidden))));
        }
        blocks.push(block);
    }

    CommandOutput::message(blocks.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{args, failing_site, site};
    use super::*;
    use crate::content::{LineMatch, Section};
    use crate::state::Site;

    async fn run_on(site: &Site, line: &str) -> String {
        let args = args(line);
        match grep(&Invocation::new(&args, "/", site)).await {
            CommandOutput::Message(m) => m,
            CommandOutput::Action(a) => panic!("unexpected action {:?}", a),
        }
    }

    #[test]
    fn test_parse_consumes_context_value() {
        let parsed = parse_args(&args("-C 1 -b redis")).unwrap();
        assert_eq!(
            parsed,
            GrepArgs {
                context: 1,
                body: true,
                term: "redis".to_string()
            }
        );
    }

    #[test]
    fn test_parse_defaults_and_errors() {
        let parsed = parse_args(&args("cache layer")).unwrap();
        assert_eq!(parsed.context, DEFAULT_CONTEXT_LINES);
        assert!(!parsed.body);
        assert_eq!(parsed.term, "cache layer");

        assert_eq!(parse_args(&args("-b")).unwrap_err(), USAGE);
        assert!(parse_args(&args("-C x foo")).is_err());
        assert!(parse_args(&args("-C")).is_err());
    }

    #[tokio::test]
    async fn test_title_mode_matches_titles_and_tags() {
        let site = site();
        let out = run_on(&site, "grep kubernetes").await;
        assert!(out.contains("no matches for &#39;kubernetes&#39;"));

        let out = run_on(&site, "grep REDIS").await;
        assert!(out.contains("blog/redis-cache"));
        assert!(!out.contains("rust-async"));

        let out = run_on(&site, "grep ui").await;
        assert!(out.contains("portfolio/palette"));
    }

    #[tokio::test]
    async fn test_body_mode_renders_context() {
        let site = site();
        let out = run_on(&site, "grep -C 1 -b redis").await;
        assert!(out.contains("<span class='hit'>4:use redis for caching</span>"));
        assert_eq!(out.matches("3-before line").count(), 1);
        assert_eq!(out.matches("5-after line").count(), 1);
    }

    #[tokio::test]
    async fn test_body_mode_search_failure() {
        let site = failing_site();
        let out = run_on(&site, "grep -b redis").await;
        assert!(out.contains("failed to search content"));
    }

    #[tokio::test]
    async fn test_empty_term_is_usage_error() {
        let site = site();
        let out = run_on(&site, "grep").await;
        assert!(out.contains("usage: grep"));
    }

    #[test]
    fn test_more_matches_footer() {
        let m = |n| LineMatch {
            line_number: n,
            content: format!("hit {}", n),
            before: vec![],
            after: vec![],
        };
        let hits = vec![SearchHit {
            slug: "s".to_string(),
            kind: Section::Til,
            title: "T".to_string(),
            matches: (1..=5).map(m).collect(),
        }];
        let CommandOutput::Message(out) = render_body_hits("hit", &hits) else {
            panic!("expected message");
        };
        assert_eq!(out.matches("class='hit'").count(), 3);
        assert!(out.contains("... 2 more matches"));
    }
}
