//! Output records written to console sessions.
//!
//! Every reply and broadcast is a sequence of [`Record`]s. The structured
//! format serializes them directly (the `event` field is the variant name);
//! the text format renders the same fields as fixed-width lines. A field
//! added here must be rendered by both formats.

use serde::Serialize;

use crate::domain::{Group, GroupId, RfCommand, ShadeId, ShadeView};
use crate::error::ConsoleError;

/// One line of the `help` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    /// Command syntax.
    pub usage: &'static str,
    /// What the command does.
    pub summary: &'static str,
}

/// Acknowledgement of an accepted device command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandAck {
    /// Shade addressed, for shade commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ShadeId>,
    /// Group addressed, for group commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    /// Requested display position, for moves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u8>,
    /// RF command sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<RfCommand>,
    /// Resolved repeat count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u8>,
    /// Step size, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u8>,
}

impl CommandAck {
    /// A shade move to `target` (display scale).
    #[must_use]
    pub const fn target(id: ShadeId, target: u8) -> Self {
        Self {
            id: Some(id),
            group: None,
            target: Some(target),
            cmd: None,
            repeat: None,
            step: None,
        }
    }

    /// An RF command sent to a single shade.
    #[must_use]
    pub const fn shade(id: ShadeId, cmd: RfCommand, repeat: u8, step: Option<u8>) -> Self {
        Self {
            id: Some(id),
            group: None,
            target: None,
            cmd: Some(cmd),
            repeat: Some(repeat),
            step,
        }
    }

    /// An RF command sent to a group.
    #[must_use]
    pub const fn group(id: GroupId, cmd: RfCommand, repeat: u8) -> Self {
        Self {
            id: None,
            group: Some(id),
            target: None,
            cmd: Some(cmd),
            repeat: Some(repeat),
            step: None,
        }
    }
}

/// Group listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    /// Group id.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Default repeat count.
    pub repeats: u8,
    /// Member shade ids.
    pub members: Vec<ShadeId>,
}

impl From<&Group> for GroupView {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            repeats: group.repeats,
            members: group.members.clone(),
        }
    }
}

/// A single output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Record {
    /// Greeting sent on accept.
    Welcome {
        /// Banner text.
        msg: String,
    },
    /// Command summary.
    Help {
        /// Available commands.
        commands: Vec<HelpEntry>,
    },
    /// Current state of a shade, in reply to a query.
    State(ShadeView),
    /// Changed state of a shade, after a command or on broadcast.
    Update(ShadeView),
    /// A previously broadcast shade left the registry.
    Removed {
        /// Last known id.
        id: ShadeId,
        /// Last known name.
        name: String,
    },
    /// Group listing entry.
    Group(GroupView),
    /// Device command accepted.
    Command(CommandAck),
    /// Informational message.
    Info {
        /// Message text.
        msg: String,
    },
    /// Command failed; the session stays open.
    Error {
        /// Numeric error code.
        code: u32,
        /// Message text.
        msg: String,
    },
    /// Session is about to close.
    Bye {
        /// Why the server is closing, absent for an operator quit.
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<&'static str>,
    },
}

impl Record {
    /// Builds an informational record.
    #[must_use]
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info { msg: msg.into() }
    }
}

impl From<&ConsoleError> for Record {
    fn from(err: &ConsoleError) -> Self {
        Self::Error {
            code: err.error_code(),
            msg: err.to_string(),
        }
    }
}

impl From<ConsoleError> for Record {
    fn from(err: ConsoleError) -> Self {
        Self::from(&err)
    }
}
