//! The device controller capability consumed by the console.
//!
//! The console never owns shades or groups. It is handed an
//! `Arc<dyn ShadeController>` at construction and goes through it for every
//! read and every physical command. Implementations are shared with other
//! subsystems (RF receive, schedulers), so every accessor returns an owned
//! copy and callers re-fetch instead of assuming two reads agree.

use std::fmt;

use super::{Group, GroupId, RfCommand, Shade, ShadeId};
use crate::error::ConsoleError;

/// Recipient of an RF command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    /// A single shade.
    Shade(ShadeId),
    /// Every member of a group.
    Group(GroupId),
}

/// Owner of the shade/group registry and the RF transmitter.
pub trait ShadeController: Send + Sync + fmt::Debug {
    /// Looks up a shade by id.
    fn shade(&self, id: ShadeId) -> Option<Shade>;

    /// Looks up a group by id.
    fn group(&self, id: GroupId) -> Option<Group>;

    /// All registered shades in slot order. Never contains the sentinel.
    fn shades(&self) -> Vec<Shade>;

    /// All registered groups in slot order.
    fn groups(&self) -> Vec<Group>;

    /// Starts moving a shade to `target` (internal scale, 0–100).
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::ShadeNotFound`] if the shade vanished, or
    /// [`ConsoleError::Controller`] if the move could not be started.
    fn move_to_target(&self, id: ShadeId, target: u8) -> Result<(), ConsoleError>;

    /// Transmits `command` to a shade or to each member of a group.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if the target vanished, or
    /// [`ConsoleError::Controller`] if transmission failed.
    fn send_command(
        &self,
        target: CommandTarget,
        command: RfCommand,
        repeat: u8,
        step: Option<u8>,
    ) -> Result<(), ConsoleError>;

    /// Translates an operator token into an RF command.
    fn translate_command(&self, token: &str) -> Option<RfCommand> {
        token.parse().ok()
    }
}
