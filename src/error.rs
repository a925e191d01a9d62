//! Console error types with stable numeric codes.
//!
//! [`ConsoleError`] is the central error type for the console. Command
//! handlers return it, and the dispatcher turns it into an `error` record
//! written back to the session that issued the command. Only the transport
//! variants ever cause a session to close.

use crate::domain::{GroupId, ShadeId};

/// Console-side error enum with numeric code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | Session effect       |
/// |-----------|-------------------|----------------------|
/// | 1000–1999 | Usage / Parse     | reply, session stays |
/// | 2000–2999 | Lookup            | reply, session stays |
/// | 3000–3999 | Transport / Setup | session or startup   |
///
/// Capacity rejections (`SessionBusy`, `ConsoleFull`) are in the 3000 range
/// and are only ever sent to the connection being turned away.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Missing or malformed arguments. Carries the usage line.
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// The first token matched no verb and was not an implicit shade id.
    #[error("Unrecognized command. Type 'help' for options.")]
    UnrecognizedCommand,

    /// The device command token could not be translated to an RF command.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// A `pos` value outside 0..=100 was supplied.
    #[error("Position must be between 0 and 100.")]
    PositionOutOfRange,

    /// A `pos` command without a value.
    #[error("Position command requires a value between 0 and 100.")]
    PositionRequired,

    /// Group verbs are switched off for this deployment.
    #[error("Group commands are disabled")]
    GroupsDisabled,

    /// No shade with the given id is registered.
    #[error("Shade {0} not found")]
    ShadeNotFound(ShadeId),

    /// No group with the given id is registered.
    #[error("Group {0} not found")]
    GroupNotFound(GroupId),

    /// Socket-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Pending output exceeded the per-session outbox bound.
    #[error("output backlog exceeded {0} bytes")]
    Backlog(usize),

    /// A second connection arrived while the single session is in use.
    #[error("Another console session is already active.")]
    SessionBusy,

    /// Every session slot is occupied.
    #[error("Console is full ({0} sessions). Try again later.")]
    ConsoleFull(usize),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Registry seed data could not be decoded.
    #[error("invalid registry seed: {0}")]
    Seed(#[from] serde_json::Error),

    /// The device controller refused or failed an operation.
    #[error("controller error: {0}")]
    Controller(String),
}

impl ConsoleError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Usage(_) => 1001,
            Self::UnrecognizedCommand => 1002,
            Self::UnknownCommand(_) => 1003,
            Self::PositionOutOfRange => 1004,
            Self::PositionRequired => 1005,
            Self::GroupsDisabled => 1006,
            Self::ShadeNotFound(_) => 2001,
            Self::GroupNotFound(_) => 2002,
            Self::Transport(_) => 3001,
            Self::Backlog(_) => 3002,
            Self::Config(_) => 3003,
            Self::SessionBusy => 3005,
            Self::ConsoleFull(_) => 3006,
            Self::Seed(_) => 3004,
            Self::Controller(_) => 3000,
        }
    }
}
