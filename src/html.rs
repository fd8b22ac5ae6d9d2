//! HTML formatting for terminal output
//!
//! Provides semantic styling functions that return formatted strings.
//! The client styles the classes; this module only decides which spans exist.

use std::sync::OnceLock;

use regex::Regex;

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    // Comments, or a tag name right after `<` / `</`; a bare `<` is text
    TAGS.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][^>]*>").expect("static pattern")
    })
}

/// Escape text for inclusion in HTML
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Remove every tag, leaving text content (entities untouched)
pub fn strip_tags(html: &str) -> String {
    tag_pattern().replace_all(html, "").into_owned()
}

/// Plain-text rendering for non-browser hosts: tags removed, entities decoded
pub fn to_plain(html: &str) -> String {
    strip_tags(html)
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Strip markup from raw user input before it is parsed
pub fn sanitize_input(raw: &str) -> String {
    strip_tags(raw).trim().to_string()
}

/// Wrap a result in the transcript shell echoing the command line
pub fn transcript(line: &str, body: &str) -> String {
    format!("<pre class='ignore'>&gt; {}\n{}</pre>", escape(line), body)
}

/// Error-styled message (text is escaped)
pub fn error(text: &str) -> String {
    format!("<span class='error'>{}</span>", escape(text))
}

/// Highlighted search hit
pub fn hit(text: &str) -> String {
    format!("<span class='hit'>{}</span>", escape(text))
}

/// De-emphasized text
pub fn dim(text: &str) -> String {
    format!("<span class='dim'>{}</span>", escape(text))
}

/// A content path or directory name
pub fn path(text: &str) -> String {
    format!("<span class='path'>{}</span>", escape(text))
}

/// A command name in listings
pub fn command(text: &str) -> String {
    format!("<span class='cmd'>{}</span>", escape(text))
}

/// Link opening in a new tab
pub fn link(href: &str, label: &str) -> String {
    format!(
        "<a href='{}' target='_blank' rel='noreferrer'>{}</a>",
        escape(href),
        escape(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>&'\""), "&lt;b&gt;&amp;&#39;&quot;");
    }

    #[test]
    fn test_strip_tags_keeps_text() {
        assert_eq!(strip_tags("<span class='x'>a</span> <i>b</i>"), "a b");
    }

    #[test]
    fn test_to_plain_decodes_after_stripping() {
        assert_eq!(to_plain("<pre>&gt; echo &lt;b&gt;&amp;lt;</pre>"), "> echo <b>&lt;");
    }

    #[test]
    fn test_sanitize_keeps_comparisons() {
        assert_eq!(sanitize_input("echo 1 < 2 and 3 > 1"), "echo 1 < 2 and 3 > 1");
        assert_eq!(sanitize_input("echo a<!-- x -->b</i>"), "echo ab");
    }

    #[test]
    fn test_sanitize_removes_attributes() {
        assert_eq!(sanitize_input("  echo <img src=x onerror=alert(1)>hi "), "echo hi");
    }

    #[test]
    fn test_transcript_escapes_line() {
        let out = transcript("echo <x>", "ok");
        assert_eq!(out, "<pre class='ignore'>&gt; echo &lt;x&gt;\nok</pre>");
    }
}
