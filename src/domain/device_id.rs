//! Type-safe device identifiers.
//!
//! Shades and groups are addressed by a small integer. The value
//! [`SENTINEL_ID`] marks an empty registry slot and can never be wrapped
//! in a [`ShadeId`] or [`GroupId`], so code holding an id always holds a
//! real device address.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved id meaning "no device in this slot".
pub const SENTINEL_ID: u8 = 255;

/// Number of id-indexed slots (ids `0..=254`).
pub const SLOT_COUNT: usize = SENTINEL_ID as usize;

/// Error returned when converting the sentinel value into a device id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("device id {0} is reserved")]
pub struct ReservedId(pub u8);

/// Identifier of a single shade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ShadeId(u8);

impl ShadeId {
    /// Wraps `raw`, returning `None` for the sentinel.
    #[must_use]
    pub const fn new(raw: u8) -> Option<Self> {
        if raw == SENTINEL_ID {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Parses an operator-supplied id token.
    ///
    /// Strict: the token must be a base-10 integer in `0..=254`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        token.parse::<u8>().ok().and_then(Self::new)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Index of this id in a fixed-size slot table.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ShadeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u8> for ShadeId {
    type Error = ReservedId;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(ReservedId(raw))
    }
}

impl From<ShadeId> for u8 {
    fn from(id: ShadeId) -> Self {
        id.0
    }
}

/// Identifier of a shade group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GroupId(u8);

impl GroupId {
    /// Wraps `raw`, returning `None` for the sentinel.
    #[must_use]
    pub const fn new(raw: u8) -> Option<Self> {
        if raw == SENTINEL_ID {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Parses an operator-supplied group id token (strict, `0..=254`).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        token.parse::<u8>().ok().and_then(Self::new)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Index of this id in a fixed-size slot table.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u8> for GroupId {
    type Error = ReservedId;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(ReservedId(raw))
    }
}

impl From<GroupId> for u8 {
    fn from(id: GroupId) -> Self {
        id.0
    }
}
