//! Informational commands and easter eggs
//!
//! Visual effects are pure signals; the client owns every side effect.

use super::{CommandOutput, Invocation};
use crate::content::Section;
use crate::html;
use crate::protocol::{ActionKind, ActionResult};

const LOGO: [&str; 6] = [
    r"   _____ ",
    r"  / ___/ ",
    r"  \__ \  ",
    r" ___/ /  ",
    r"/____/   ",
    r"         ",
];

pub(super) fn whoami(inv: &Invocation<'_>) -> CommandOutput {
    let profile = &inv.site.profile;
    CommandOutput::message(format!(
        "{}\n{}",
        html::command(&profile.name),
        html::escape(&profile.bio)
    ))
}

pub(super) fn contact(inv: &Invocation<'_>) -> CommandOutput {
    let profile = &inv.site.profile;
    CommandOutput::message(format!(
        "email   {}\ngithub  {}\nx       {}",
        html::link(&format!("mailto:{}", profile.email), &profile.email),
        html::link(&profile.github_url, &profile.github_url),
        html::link(&profile.x_url, &profile.x_url),
    ))
}

pub(super) fn echo(inv: &Invocation<'_>) -> CommandOutput {
    CommandOutput::message(html::escape(&inv.rest().join(" ")))
}

pub(super) fn neofetch(inv: &Invocation<'_>) -> CommandOutput {
    let profile = &inv.site.profile;
    let index = &inv.site.index;
    let title = format!("{}@{}", profile.handle, profile.hostname);

    let info = [
        html::command(&title),
        "-".repeat(title.chars().count()),
        format!("OS: siteterm {}", env!("CARGO_PKG_VERSION")),
        "Shell: siteterm-sh".to_string(),
        format!("Posts: {}", index.list(Section::Blog).len()),
        format!("Projects: {}", index.list(Section::Portfolio).len()),
        format!("TILs: {}", index.list(Section::Til).len()),
    ];

    let rows = LOGO.len().max(info.len());
    let lines: Vec<String> = (0..rows)
        .map(|i| {
            let logo = LOGO.get(i).copied().unwrap_or("         ");
            let text = info.get(i).map(String::as_str).unwrap_or("");
            format!("{}  {}", html::path(logo), text)
        })
        .collect();

    CommandOutput::message(lines.join("\n"))
}

pub(super) fn clear(_inv: &Invocation<'_>) -> CommandOutput {
    CommandOutput::action(ActionKind::Clear)
}

pub(super) fn history(_inv: &Invocation<'_>) -> CommandOutput {
    CommandOutput::action(ActionKind::History)
}

pub(super) fn github(inv: &Invocation<'_>) -> CommandOutput {
    ActionResult::new(ActionKind::OpenUrl)
        .with_url(inv.site.profile.github_url.clone())
        .into()
}

pub(super) fn x(inv: &Invocation<'_>) -> CommandOutput {
    ActionResult::new(ActionKind::OpenUrl)
        .with_url(inv.site.profile.x_url.clone())
        .into()
}

pub(super) fn matrix(_inv: &Invocation<'_>) -> CommandOutput {
    CommandOutput::action(ActionKind::Matrix)
}

pub(super) fn fireworks(_inv: &Invocation<'_>) -> CommandOutput {
    CommandOutput::action(ActionKind::Fireworks)
}

pub(super) fn confetti(_inv: &Invocation<'_>) -> CommandOutput {
    CommandOutput::action(ActionKind::Confetti)
}

pub(super) fn rain(_inv: &Invocation<'_>) -> CommandOutput {
    CommandOutput::action(ActionKind::Rain)
}

pub(super) fn rotate(_inv: &Invocation<'_>) -> CommandOutput {
    CommandOutput::action(ActionKind::Rotate)
}

pub(super) fn hack(_inv: &Invocation<'_>) -> CommandOutput {
    ActionResult::new(ActionKind::Malware)
        .with_message("Downloading more RAM...")
        .into()
}

fn has_force_recursive(args: &[String]) -> bool {
    args.iter().any(|a| a == "-rf" || a == "-fr")
}

pub(super) fn rm(inv: &Invocation<'_>) -> CommandOutput {
    if has_force_recursive(inv.rest()) {
        return CommandOutput::action(ActionKind::RmRf);
    }
    match inv.arg(0) {
        None => CommandOutput::error("rm: missing operand"),
        Some(target) => CommandOutput::error(&format!(
            "rm: cannot remove '{}': Permission denied",
            target
        )),
    }
}

pub(super) fn sudo(inv: &Invocation<'_>) -> CommandOutput {
    match inv.arg(0) {
        Some("rm") if has_force_recursive(&inv.rest()[1..]) => CommandOutput::action(ActionKind::RmRf),
        Some("rm") => CommandOutput::error("rm: refusing to run without -rf. Nice try."),
        Some(other) => CommandOutput::error(&format!("sudo: {}: command not found", other)),
        None => CommandOutput::error("usage: sudo <command>"),
    }
}
