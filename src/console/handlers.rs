//! Command handlers.
//!
//! Each handler validates its own arguments, calls into the controller and
//! returns the records to write back. Failures come back as
//! [`ConsoleError`] and are rendered as an `error` record by the
//! dispatcher; a handler never closes the session.
//!
//! Percentage policy: `target` clamps its value to `0..=100`, while
//! `shade <id> pos <value>` rejects anything outside that range.

use super::command::{Command, parse_lenient};
use super::record::{CommandAck, GroupView, HelpEntry, Record};
use crate::domain::{CommandTarget, GroupId, Shade, ShadeController, ShadeId};
use crate::error::ConsoleError;

const SHADE_USAGE: &str = "shade <shadeId> [<command> [repeat] | pos <0-100>]";
const TARGET_USAGE: &str = "target <shadeId> <0-100>";
const CMD_USAGE: &str = "cmd <shadeId> <command> [repeat] [stepSize]";
const GROUP_USAGE: &str = "group <groupId> <command> [repeat]";

const HELP: &[HelpEntry] = &[
    HelpEntry {
        usage: "help | ?",
        summary: "Show this help",
    },
    HelpEntry {
        usage: "list | status",
        summary: "List all shades",
    },
    HelpEntry {
        usage: "shade | get | show <id>",
        summary: "Show one shade",
    },
    HelpEntry {
        usage: "target | set | goto <id> <0-100>",
        summary: "Move shade to a percentage",
    },
    HelpEntry {
        usage: "cmd | send | control <id> <cmd> [repeat] [step]",
        summary: "Send an RF command to a shade",
    },
    HelpEntry {
        usage: "<id> <cmd> [repeat]",
        summary: "Same as shade <id> <cmd> [repeat]",
    },
    HelpEntry {
        usage: "<id> pos <0-100>",
        summary: "Move shade to a percentage",
    },
    HelpEntry {
        usage: "exit | quit | bye",
        summary: "Close the session",
    },
];

const GROUP_HELP: &[HelpEntry] = &[
    HelpEntry {
        usage: "groups",
        summary: "List all groups",
    },
    HelpEntry {
        usage: "group <id> <cmd> [repeat]",
        summary: "Send an RF command to a group",
    },
];

/// `help`: the command summary.
#[must_use]
pub fn help(groups_enabled: bool) -> Vec<Record> {
    let mut commands = HELP.to_vec();
    if groups_enabled {
        commands.extend_from_slice(GROUP_HELP);
    }
    vec![Record::Help { commands }]
}

/// `list`: one `state` record per registered shade.
#[must_use]
pub fn list_shades(controller: &dyn ShadeController) -> Vec<Record> {
    let records: Vec<Record> = controller
        .shades()
        .iter()
        .map(|shade| Record::State(shade.view()))
        .collect();
    if records.is_empty() {
        return vec![Record::info("No shades configured")];
    }
    records
}

/// `groups`: one `group` record per registered group.
///
/// # Errors
///
/// Returns [`ConsoleError::GroupsDisabled`] when groups are switched off.
pub fn list_groups(
    controller: &dyn ShadeController,
    groups_enabled: bool,
) -> Result<Vec<Record>, ConsoleError> {
    if !groups_enabled {
        return Err(ConsoleError::GroupsDisabled);
    }
    let records: Vec<Record> = controller
        .groups()
        .iter()
        .map(|group| Record::Group(GroupView::from(group)))
        .collect();
    if records.is_empty() {
        return Ok(vec![Record::info("No groups configured")]);
    }
    Ok(records)
}

/// `shade <id> [<cmd> [repeat] | pos <0-100>]`, also the implicit
/// `<id> ...` form.
///
/// # Errors
///
/// Usage, lookup, range and unknown-command errors.
pub fn shade(
    controller: &dyn ShadeController,
    cmd: &Command<'_>,
) -> Result<Vec<Record>, ConsoleError> {
    let id = cmd
        .arg(0)
        .and_then(ShadeId::parse)
        .ok_or(ConsoleError::Usage(SHADE_USAGE))?;
    let shade = controller.shade(id).ok_or(ConsoleError::ShadeNotFound(id))?;
    match cmd.arg(1) {
        None => Ok(vec![Record::State(shade.view())]),
        Some(token) if is_position_keyword(token) => {
            let raw = cmd.arg(2).ok_or(ConsoleError::PositionRequired)?;
            let pct = u8::try_from(parse_lenient(raw))
                .ok()
                .filter(|p| *p <= 100)
                .ok_or(ConsoleError::PositionOutOfRange)?;
            start_move(controller, &shade, pct)
        }
        Some(token) => transmit(controller, &shade, token, cmd.arg(2), None),
    }
}

/// `target <id> <pct>`: clamps `pct` to `0..=100` and moves the shade.
///
/// # Errors
///
/// Usage and lookup errors.
pub fn target(
    controller: &dyn ShadeController,
    cmd: &Command<'_>,
) -> Result<Vec<Record>, ConsoleError> {
    let (Some(id), Some(raw)) = (cmd.arg(0).and_then(ShadeId::parse), cmd.arg(1)) else {
        return Err(ConsoleError::Usage(TARGET_USAGE));
    };
    let pct = clamp_percent(parse_lenient(raw));
    let shade = controller.shade(id).ok_or(ConsoleError::ShadeNotFound(id))?;
    start_move(controller, &shade, pct)
}

/// `cmd <id> <cmd> [repeat] [step]`.
///
/// # Errors
///
/// Usage, lookup and unknown-command errors.
pub fn send(
    controller: &dyn ShadeController,
    cmd: &Command<'_>,
) -> Result<Vec<Record>, ConsoleError> {
    let (Some(id), Some(token)) = (cmd.arg(0).and_then(ShadeId::parse), cmd.arg(1)) else {
        return Err(ConsoleError::Usage(CMD_USAGE));
    };
    let shade = controller.shade(id).ok_or(ConsoleError::ShadeNotFound(id))?;
    transmit(controller, &shade, token, cmd.arg(2), cmd.arg(3))
}

/// `group <gid> <cmd> [repeat]`.
///
/// # Errors
///
/// Disabled-feature, usage, lookup and unknown-command errors.
pub fn group(
    controller: &dyn ShadeController,
    cmd: &Command<'_>,
    groups_enabled: bool,
) -> Result<Vec<Record>, ConsoleError> {
    if !groups_enabled {
        return Err(ConsoleError::GroupsDisabled);
    }
    let (Some(gid), Some(token)) = (cmd.arg(0).and_then(GroupId::parse), cmd.arg(1)) else {
        return Err(ConsoleError::Usage(GROUP_USAGE));
    };
    let group = controller
        .group(gid)
        .ok_or(ConsoleError::GroupNotFound(gid))?;
    let command = controller
        .translate_command(token)
        .ok_or_else(|| ConsoleError::UnknownCommand(token.to_string()))?;
    let repeat = resolve_repeat(cmd.arg(2), group.repeats);
    controller.send_command(CommandTarget::Group(gid), command, repeat, None)?;
    tracing::debug!(group = %gid, %command, repeat, "group command sent");
    Ok(vec![Record::Command(CommandAck::group(gid, command, repeat))])
}

fn start_move(
    controller: &dyn ShadeController,
    shade: &Shade,
    pct: u8,
) -> Result<Vec<Record>, ConsoleError> {
    controller.move_to_target(shade.id, shade.transform_position(pct))?;
    tracing::debug!(shade = %shade.id, target = pct, "move requested");
    let mut records = vec![Record::Command(CommandAck::target(shade.id, pct))];
    records.extend(controller.shade(shade.id).map(|s| Record::Update(s.view())));
    Ok(records)
}

fn transmit(
    controller: &dyn ShadeController,
    shade: &Shade,
    token: &str,
    repeat: Option<&str>,
    step: Option<&str>,
) -> Result<Vec<Record>, ConsoleError> {
    let command = controller
        .translate_command(token)
        .ok_or_else(|| ConsoleError::UnknownCommand(token.to_string()))?;
    let repeat = resolve_repeat(repeat, shade.repeats);
    let step = step.map(|s| saturate_u8(parse_lenient(s)));
    controller.send_command(CommandTarget::Shade(shade.id), command, repeat, step)?;
    tracing::debug!(shade = %shade.id, %command, repeat, ?step, "shade command sent");
    let mut records = vec![Record::Command(CommandAck::shade(
        shade.id, command, repeat, step,
    ))];
    records.extend(controller.shade(shade.id).map(|s| Record::Update(s.view())));
    Ok(records)
}

fn is_position_keyword(token: &str) -> bool {
    token.eq_ignore_ascii_case("pos") || token.eq_ignore_ascii_case("position")
}

/// An explicit positive repeat overrides `default`; anything else keeps it.
fn resolve_repeat(token: Option<&str>, default: u8) -> u8 {
    token
        .map(parse_lenient)
        .filter(|r| *r > 0)
        .map_or(default, saturate_u8)
}

fn clamp_percent(value: i64) -> u8 {
    saturate_u8(value.clamp(0, 100))
}

fn saturate_u8(value: i64) -> u8 {
    u8::try_from(value.clamp(0, i64::from(u8::MAX))).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_falls_back_to_default() {
        assert_eq!(resolve_repeat(None, 4), 4);
        assert_eq!(resolve_repeat(Some("0"), 4), 4);
        assert_eq!(resolve_repeat(Some("-3"), 4), 4);
        assert_eq!(resolve_repeat(Some("abc"), 4), 4);
    }

    #[test]
    fn positive_repeat_overrides_default() {
        assert_eq!(resolve_repeat(Some("7"), 4), 7);
        assert_eq!(resolve_repeat(Some("9000"), 4), u8::MAX);
    }

    #[test]
    fn percent_clamps_to_range() {
        assert_eq!(clamp_percent(150), 100);
        assert_eq!(clamp_percent(-20), 0);
        assert_eq!(clamp_percent(42), 42);
    }

    #[test]
    fn help_lists_group_verbs_only_when_enabled() {
        let count = |records: Vec<Record>| match records.first() {
            Some(Record::Help { commands }) => commands.len(),
            _ => 0,
        };
        assert_eq!(count(help(true)), HELP.len() + GROUP_HELP.len());
        assert_eq!(count(help(false)), HELP.len());
    }

    #[test]
    fn position_keyword_is_case_insensitive() {
        assert!(is_position_keyword("POS"));
        assert!(is_position_keyword("Position"));
        assert!(!is_position_keyword("up"));
    }
}
