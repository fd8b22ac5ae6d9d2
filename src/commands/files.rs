//! File-like commands over the content index: cat, man

use tracing::warn;

use super::{CommandOutput, Invocation};
use crate::content::split_frontmatter;
use crate::html;

const CAT_LINES: usize = 5;

pub(super) fn cat(inv: &Invocation<'_>) -> CommandOutput {
    let Some(slug) = inv.arg(0) else {
        return CommandOutput::error("cat: missing file operand");
    };

    let source = match inv.site.index.read_source(slug) {
        Ok(Some(source)) => source,
        Ok(None) => return CommandOutput::error(&format!("cat: {}: No such file or directory", slug)),
        Err(e) => {
            warn!(slug, "cat failed: {}", e);
            return CommandOutput::error(&format!("cat: {}: No such file or directory", slug));
        }
    };

    let (_, body) = split_frontmatter(&source);
    let lines: Vec<String> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(CAT_LINES)
        .map(html::escape)
        .collect();

    CommandOutput::message(lines.join("\n"))
}

pub(super) fn man(inv: &Invocation<'_>) -> CommandOutput {
    let Some(slug) = inv.arg(0) else {
        return CommandOutput::error("What manual page do you want?");
    };

    let Some(item) = inv.site.index.find(slug) else {
        return CommandOutput::error(&format!("No manual entry for {}", slug));
    };

    let date = item
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let tags = if item.tags.is_empty() {
        "none".to_string()
    } else {
        item.tags.join(", ")
    };

    let out = format!(
        "<b>NAME</b>\n    {} - {}\n\n<b>DATE</b>\n    {}\n\n<b>TAGS</b>\n    {}\n\n<b>LOCATION</b>\n    {}",
        html::escape(&item.slug),
        html::escape(&item.title),
        date,
        html::escape(&tags),
        html::path(&item.url()),
    );
    CommandOutput::message(out)
}
