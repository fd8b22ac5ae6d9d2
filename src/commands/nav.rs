//! Navigation commands: cd, ls, pwd, tree

use super::{CommandOutput, Invocation};
use crate::content::Section;
use crate::html;
use crate::protocol::{ActionKind, ActionResult};

/// Top-level site sections shown by `ls`
pub const SECTIONS: [&str; 3] = ["blog", "portfolio", "til"];

/// Targets offered by `cd` tab completion
pub const CD_TARGETS: [&str; 4] = ["blog", "portfolio", "til", "home"];

/// Compute the path `cd target` leads to from `referer`
pub fn resolve_cd(referer: &str, target: Option<&str>) -> String {
    let referer = if referer.is_empty() { "/" } else { referer };

    match target {
        None | Some("") | Some("~") | Some("home") => "/".to_string(),
        Some("..") => {
            let trimmed = referer.trim_end_matches('/');
            match trimmed.rfind('/') {
                Some(0) | None => "/".to_string(),
                Some(idx) => trimmed[..idx].to_string(),
            }
        }
        Some(abs) if abs.starts_with('/') => abs.to_string(),
        Some(rel) => {
            let base = referer.trim_end_matches('/');
            format!("{}/{}", base, rel)
        }
    }
}

pub(super) fn cd(inv: &Invocation<'_>) -> CommandOutput {
    let url = resolve_cd(inv.referer, inv.arg(0));
    ActionResult::new(ActionKind::Navigate).with_url(url).into()
}

pub(super) fn ls(_inv: &Invocation<'_>) -> CommandOutput {
    let listing: Vec<String> = SECTIONS
        .iter()
        .map(|s| html::path(&format!("{}/", s)))
        .collect();
    CommandOutput::message(listing.join("  "))
}

pub(super) fn pwd(inv: &Invocation<'_>) -> CommandOutput {
    let path = if inv.referer.is_empty() { "/" } else { inv.referer };
    CommandOutput::message(html::escape(path))
}

/// Render nested nodes with box-drawing branches
fn render_tree(root: &str, nodes: &[(String, Vec<String>)]) -> String {
    let mut out = html::path(root);
    for (i, (name, children)) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        out.push_str(&format!("\n{}{}", branch, html::path(name)));

        for (j, child) in children.iter().enumerate() {
            let child_branch = if j + 1 == children.len() {
                "└── "
            } else {
                "├── "
            };
            out.push_str(&format!("\n{}{}{}", indent, child_branch, html::escape(child)));
        }
    }
    out
}

pub(super) fn tree(inv: &Invocation<'_>) -> CommandOutput {
    let slugs = |section: Section| -> Vec<String> {
        inv.site
            .index
            .list(section)
            .into_iter()
            .map(|item| item.slug)
            .collect()
    };

    let nodes = vec![
        ("blog".to_string(), slugs(Section::Blog)),
        ("portfolio".to_string(), slugs(Section::Portfolio)),
        ("til".to_string(), Vec::new()),
    ];

    CommandOutput::message(render_tree("~", &nodes))
}
