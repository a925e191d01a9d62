//! Shade and group device model.
//!
//! [`Shade`] and [`Group`] are owned by the controller. The console only
//! ever sees cloned copies, so every value here is a snapshot-in-time of
//! the registry. [`ShadeView`] is the observable field set that records
//! are rendered from and that the diff engine compares.

use serde::{Deserialize, Serialize};

use super::{GroupId, ShadeId};

/// Secondary (slat angle) axis of a tilt-capable shade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tilt {
    /// Current tilt position, 0–100 internal scale.
    #[serde(default)]
    pub position: u8,
    /// Tilt target, 0–100 internal scale.
    #[serde(default)]
    pub target: u8,
    /// -1 closing, 0 idle, 1 opening.
    #[serde(default)]
    pub direction: i8,
}

/// A single motorized window covering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shade {
    /// Registry id.
    pub id: ShadeId,
    /// Display name.
    pub name: String,
    /// RF remote address the shade is paired with.
    #[serde(default)]
    pub remote_address: u32,
    /// Current position, 0–100 internal scale.
    #[serde(default)]
    pub position: u8,
    /// Target position, 0–100 internal scale.
    #[serde(default)]
    pub target: u8,
    /// -1 moving up, 0 idle, 1 moving down.
    #[serde(default)]
    pub direction: i8,
    /// Tilt axis, present only for tilt-capable shades.
    #[serde(default)]
    pub tilt: Option<Tilt>,
    /// Status flag bitmask.
    #[serde(default)]
    pub flags: u8,
    /// Default RF frame repeat count.
    #[serde(default = "default_repeats")]
    pub repeats: u8,
    /// Whether the display scale is flipped relative to the motor scale.
    #[serde(default)]
    pub inverted: bool,
}

const fn default_repeats() -> u8 {
    1
}

impl Shade {
    /// Creates an idle, fully-open shade with default settings.
    #[must_use]
    pub fn new(id: ShadeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            remote_address: 0,
            position: 0,
            target: 0,
            direction: 0,
            tilt: None,
            flags: 0,
            repeats: default_repeats(),
            inverted: false,
        }
    }

    /// Maps a percentage between the internal and the display scale.
    ///
    /// The mapping is its own inverse, so the same call converts an
    /// operator-supplied display value into a motor target.
    #[must_use]
    pub const fn transform_position(&self, pct: u8) -> u8 {
        let pct = if pct > 100 { 100 } else { pct };
        if self.inverted { 100 - pct } else { pct }
    }

    /// Returns the observable field set in display scale.
    #[must_use]
    pub fn view(&self) -> ShadeView {
        ShadeView {
            id: self.id,
            name: self.name.clone(),
            position: self.transform_position(self.position),
            target: self.transform_position(self.target),
            direction: self.direction,
            remote_address: self.remote_address,
            flags: self.flags,
            tilt: self.tilt.map(|t| TiltView {
                position: self.transform_position(t.position),
                target: self.transform_position(t.target),
                direction: t.direction,
            }),
        }
    }
}

/// Tilt fields as rendered in records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TiltView {
    /// Displayed tilt position.
    #[serde(rename = "tiltPos")]
    pub position: u8,
    /// Displayed tilt target.
    #[serde(rename = "tiltTarget")]
    pub target: u8,
    /// Tilt direction.
    #[serde(rename = "tiltDir")]
    pub direction: i8,
}

/// Observable state of one shade, in display scale.
///
/// Two views compare equal exactly when no operator-visible field differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadeView {
    /// Shade id.
    pub id: ShadeId,
    /// Display name.
    pub name: String,
    /// Displayed position.
    #[serde(rename = "pos")]
    pub position: u8,
    /// Displayed target.
    pub target: u8,
    /// Direction indicator.
    #[serde(rename = "dir")]
    pub direction: i8,
    /// RF remote address.
    #[serde(rename = "addr")]
    pub remote_address: u32,
    /// Status flag bitmask.
    pub flags: u8,
    /// Tilt fields, flattened into the record when present.
    #[serde(flatten)]
    pub tilt: Option<TiltView>,
}

/// A named set of shades that receive the same command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Registry id.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Default RF frame repeat count.
    #[serde(default = "default_repeats")]
    pub repeats: u8,
    /// Member shades.
    #[serde(default)]
    pub members: Vec<ShadeId>,
}

impl Group {
    /// Creates an empty group.
    #[must_use]
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            repeats: default_repeats(),
            members: Vec::new(),
        }
    }
}
