//! In-process shade registry implementing [`ShadeController`].
//!
//! [`MemoryRegistry`] keeps shades and groups in fixed-size, id-indexed
//! slot tables behind a single [`std::sync::RwLock`]. It stands in for the
//! RF hardware: commands update targets immediately and
//! [`MemoryRegistry::advance`] walks positions toward their targets the way
//! a motor would. Every transmitted frame is recorded so callers can
//! inspect exactly what would have gone on air.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Deserialize;

use super::device_id::SLOT_COUNT;
use super::{CommandTarget, Group, GroupId, RfCommand, Shade, ShadeController, ShadeId, Tilt};
use crate::error::ConsoleError;

/// Bit set in [`Shade::flags`] while sun automation is enabled.
pub const SUN_FLAG: u8 = 0x01;

/// One command frame handed to the (simulated) transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentCommand {
    /// Shade or group addressed.
    pub target: CommandTarget,
    /// Command transmitted.
    pub command: RfCommand,
    /// Resolved repeat count.
    pub repeat: u8,
    /// Step size for step commands, if supplied.
    pub step: Option<u8>,
}

/// Registry contents as loaded from a JSON seed file.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrySeed {
    /// Shades to register.
    #[serde(default)]
    pub shades: Vec<Shade>,
    /// Groups to register.
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug)]
struct Slots {
    shades: Vec<Option<Shade>>,
    groups: Vec<Option<Group>>,
    sent: Vec<SentCommand>,
}

/// Thread-safe fixed-slot registry of shades and groups.
#[derive(Debug)]
pub struct MemoryRegistry {
    inner: RwLock<Slots>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Slots {
                shades: vec![None; SLOT_COUNT],
                groups: vec![None; SLOT_COUNT],
                sent: Vec::new(),
            }),
        }
    }

    /// Creates a registry populated from `seed`. Later duplicates win.
    #[must_use]
    pub fn from_seed(seed: RegistrySeed) -> Self {
        let registry = Self::new();
        for shade in seed.shades {
            registry.insert(shade);
        }
        for group in seed.groups {
            registry.insert_group(group);
        }
        registry
    }

    /// Parses a JSON seed document (`{"shades": [...], "groups": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Seed`] if the document is malformed or uses
    /// the reserved id.
    pub fn from_json(json: &str) -> Result<Self, ConsoleError> {
        let seed: RegistrySeed = serde_json::from_str(json)?;
        Ok(Self::from_seed(seed))
    }

    /// A small registry used when no seed file is configured.
    #[must_use]
    pub fn demo() -> Self {
        let registry = Self::new();
        let ids: Vec<ShadeId> = [1u8, 2, 3].into_iter().filter_map(ShadeId::new).collect();
        let names = ["Living Room", "Bedroom", "Office Blind"];
        for (offset, (id, name)) in ids.iter().zip(names).enumerate() {
            let mut shade = Shade::new(*id, name);
            shade.remote_address = 0x0010_0000 + u32::from(id.get());
            shade.repeats = 1;
            if offset == 2 {
                shade.tilt = Some(Tilt::default());
            }
            registry.insert(shade);
        }
        if let Some(gid) = GroupId::new(1) {
            let mut group = Group::new(gid, "Downstairs");
            group.members = ids.iter().take(2).copied().collect();
            registry.insert_group(group);
        }
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `shade` in its slot, returning the previous occupant.
    pub fn insert(&self, shade: Shade) -> Option<Shade> {
        let mut slots = self.write();
        slots.shades.get_mut(shade.id.slot())?.replace(shade)
    }

    /// Removes a shade, returning it if it was registered.
    pub fn remove(&self, id: ShadeId) -> Option<Shade> {
        self.write().shades.get_mut(id.slot())?.take()
    }

    /// Registers `group` in its slot, returning the previous occupant.
    pub fn insert_group(&self, group: Group) -> Option<Group> {
        let mut slots = self.write();
        slots.groups.get_mut(group.id.slot())?.replace(group)
    }

    /// Mutates a registered shade in place. Returns `false` if absent.
    pub fn update(&self, id: ShadeId, f: impl FnOnce(&mut Shade)) -> bool {
        let mut slots = self.write();
        match slots.shades.get_mut(id.slot()).and_then(Option::as_mut) {
            Some(shade) => {
                f(shade);
                true
            }
            None => false,
        }
    }

    /// Returns every frame transmitted so far, oldest first.
    #[must_use]
    pub fn sent_commands(&self) -> Vec<SentCommand> {
        self.read().sent.clone()
    }

    /// Moves every shade up to `step` points toward its target.
    ///
    /// Returns the number of shades whose position changed.
    pub fn advance(&self, step: u8) -> usize {
        let mut slots = self.write();
        let mut moved = 0;
        for shade in slots.shades.iter_mut().flatten() {
            let before = (shade.position, shade.tilt.map(|t| t.position));
            shade.position = approach(shade.position, shade.target, step);
            if shade.position == shade.target {
                shade.direction = 0;
            }
            if let Some(tilt) = shade.tilt.as_mut() {
                tilt.position = approach(tilt.position, tilt.target, step);
                if tilt.position == tilt.target {
                    tilt.direction = 0;
                }
            }
            if before != (shade.position, shade.tilt.map(|t| t.position)) {
                moved += 1;
            }
        }
        moved
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadeController for MemoryRegistry {
    fn shade(&self, id: ShadeId) -> Option<Shade> {
        self.read().shades.get(id.slot()).cloned().flatten()
    }

    fn group(&self, id: GroupId) -> Option<Group> {
        self.read().groups.get(id.slot()).cloned().flatten()
    }

    fn shades(&self) -> Vec<Shade> {
        self.read().shades.iter().flatten().cloned().collect()
    }

    fn groups(&self) -> Vec<Group> {
        self.read().groups.iter().flatten().cloned().collect()
    }

    fn move_to_target(&self, id: ShadeId, target: u8) -> Result<(), ConsoleError> {
        let moved = self.update(id, |shade| set_target(shade, target.min(100)));
        if moved {
            Ok(())
        } else {
            Err(ConsoleError::ShadeNotFound(id))
        }
    }

    fn send_command(
        &self,
        target: CommandTarget,
        command: RfCommand,
        repeat: u8,
        step: Option<u8>,
    ) -> Result<(), ConsoleError> {
        let mut slots = self.write();
        let members = match target {
            CommandTarget::Shade(id) => {
                if slots.shades.get(id.slot()).is_none_or(Option::is_none) {
                    return Err(ConsoleError::ShadeNotFound(id));
                }
                vec![id]
            }
            CommandTarget::Group(gid) => slots
                .groups
                .get(gid.slot())
                .and_then(Option::as_ref)
                .map(|g| g.members.clone())
                .ok_or(ConsoleError::GroupNotFound(gid))?,
        };
        for id in members {
            if let Some(shade) = slots.shades.get_mut(id.slot()).and_then(Option::as_mut) {
                apply_command(shade, command, step);
            }
        }
        slots.sent.push(SentCommand {
            target,
            command,
            repeat,
            step,
        });
        tracing::debug!(?target, %command, repeat, ?step, "rf command transmitted");
        Ok(())
    }
}

fn approach(current: u8, target: u8, step: u8) -> u8 {
    if current < target {
        current.saturating_add(step).min(target)
    } else {
        current.saturating_sub(step).max(target)
    }
}

fn set_target(shade: &mut Shade, target: u8) {
    shade.target = target;
    shade.direction = match target.cmp(&shade.position) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    };
}

fn apply_command(shade: &mut Shade, command: RfCommand, step: Option<u8>) {
    let moving = shade.direction != 0;
    match command {
        RfCommand::Up => set_target(shade, 0),
        RfCommand::Down => set_target(shade, 100),
        RfCommand::Stop => set_target(shade, shade.position),
        RfCommand::My | RfCommand::Toggle if moving => set_target(shade, shade.position),
        RfCommand::Toggle => {
            let target = if shade.position >= 50 { 0 } else { 100 };
            set_target(shade, target);
        }
        RfCommand::StepUp => {
            let target = shade.position.saturating_sub(step.unwrap_or(1).max(1));
            set_target(shade, target);
        }
        RfCommand::StepDown => {
            let target = shade
                .position
                .saturating_add(step.unwrap_or(1).max(1))
                .min(100);
            set_target(shade, target);
        }
        RfCommand::SunFlag => shade.flags |= SUN_FLAG,
        RfCommand::Flag => shade.flags ^= SUN_FLAG,
        RfCommand::My | RfCommand::Prog | RfCommand::Favorite | RfCommand::Sensor => {}
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn id(raw: u8) -> ShadeId {
        let Some(id) = ShadeId::new(raw) else {
            panic!("valid id");
        };
        id
    }

    fn registry_with(raw: u8) -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        registry.insert(Shade::new(id(raw), "Test"));
        registry
    }

    #[test]
    fn insert_get_remove() {
        let registry = registry_with(4);
        assert!(registry.shade(id(4)).is_some());
        assert_eq!(registry.shades().len(), 1);
        assert!(registry.remove(id(4)).is_some());
        assert!(registry.shade(id(4)).is_none());
        assert!(registry.shades().is_empty());
    }

    #[test]
    fn move_to_target_sets_direction() {
        let registry = registry_with(1);
        assert!(registry.move_to_target(id(1), 60).is_ok());
        let Some(shade) = registry.shade(id(1)) else {
            panic!("shade exists");
        };
        assert_eq!(shade.target, 60);
        assert_eq!(shade.direction, 1);
    }

    #[test]
    fn move_unknown_shade_fails() {
        let registry = MemoryRegistry::new();
        let result = registry.move_to_target(id(9), 10);
        assert!(matches!(result, Err(ConsoleError::ShadeNotFound(_))));
    }

    #[test]
    fn send_command_to_unknown_shade_records_nothing() {
        let registry = MemoryRegistry::new();
        let result = registry.send_command(CommandTarget::Shade(id(7)), RfCommand::Up, 1, None);
        assert!(result.is_err());
        assert!(registry.sent_commands().is_empty());
    }

    #[test]
    fn down_then_advance_reaches_target() {
        let registry = registry_with(2);
        let sent = registry.send_command(CommandTarget::Shade(id(2)), RfCommand::Down, 3, None);
        assert!(sent.is_ok());
        for _ in 0..10 {
            registry.advance(10);
        }
        let Some(shade) = registry.shade(id(2)) else {
            panic!("shade exists");
        };
        assert_eq!(shade.position, 100);
        assert_eq!(shade.direction, 0);
        assert_eq!(registry.advance(10), 0);
        assert_eq!(registry.sent_commands().len(), 1);
    }

    #[test]
    fn group_command_fans_out_to_members() {
        let registry = MemoryRegistry::demo();
        let Some(gid) = GroupId::new(1) else {
            panic!("valid group id");
        };
        let sent = registry.send_command(CommandTarget::Group(gid), RfCommand::Down, 2, None);
        assert!(sent.is_ok());
        let targets: Vec<u8> = registry.shades().iter().map(|s| s.target).collect();
        assert_eq!(targets, vec![100, 100, 0]);
    }

    #[test]
    fn flag_toggles_sun_bit() {
        let registry = registry_with(3);
        let _ = registry.send_command(CommandTarget::Shade(id(3)), RfCommand::Flag, 1, None);
        assert_eq!(registry.shade(id(3)).map(|s| s.flags), Some(SUN_FLAG));
        let _ = registry.send_command(CommandTarget::Shade(id(3)), RfCommand::Flag, 1, None);
        assert_eq!(registry.shade(id(3)).map(|s| s.flags), Some(0));
    }

    #[test]
    fn seed_json_loads_shades_and_groups() {
        let json = r#"{
            "shades": [{"id": 1, "name": "A"}, {"id": 9, "name": "B", "repeats": 4}],
            "groups": [{"id": 0, "name": "All", "members": [1, 9]}]
        }"#;
        let Ok(registry) = MemoryRegistry::from_json(json) else {
            panic!("seed should parse");
        };
        assert_eq!(registry.shades().len(), 2);
        assert_eq!(registry.shade(id(9)).map(|s| s.repeats), Some(4));
        assert_eq!(registry.groups().len(), 1);
    }

    #[test]
    fn seed_with_sentinel_id_is_rejected() {
        let json = r#"{"shades": [{"id": 255, "name": "Ghost"}]}"#;
        assert!(MemoryRegistry::from_json(json).is_err());
    }
}
