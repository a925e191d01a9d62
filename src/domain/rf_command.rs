//! RF remote commands understood by shade motors.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A command frame the controller can transmit to a shade or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RfCommand {
    /// Raise fully.
    Up,
    /// Lower fully.
    Down,
    /// Stop if moving, otherwise go to the stored "my" position.
    My,
    /// Stop movement.
    Stop,
    /// Alternate between up, stop and down.
    Toggle,
    /// Pairing / programming frame.
    Prog,
    /// Go to the favorite position.
    Favorite,
    /// Enable sun-sensor automation.
    SunFlag,
    /// Toggle the sun flag.
    Flag,
    /// Move up by one step.
    StepUp,
    /// Move down by one step.
    StepDown,
    /// Sensor frame.
    Sensor,
}

impl RfCommand {
    /// Canonical lower-case token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::My => "my",
            Self::Stop => "stop",
            Self::Toggle => "toggle",
            Self::Prog => "prog",
            Self::Favorite => "favorite",
            Self::SunFlag => "sunflag",
            Self::Flag => "flag",
            Self::StepUp => "stepup",
            Self::StepDown => "stepdown",
            Self::Sensor => "sensor",
        }
    }
}

impl fmt::Display for RfCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a token that names no RF command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rf command: {0}")]
pub struct UnknownRfCommand(pub String);

impl FromStr for RfCommand {
    type Err = UnknownRfCommand;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let cmd = match token.to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "my" => Self::My,
            "stop" => Self::Stop,
            "toggle" => Self::Toggle,
            "prog" => Self::Prog,
            "favorite" | "fav" => Self::Favorite,
            "sunflag" => Self::SunFlag,
            "flag" => Self::Flag,
            "stepup" => Self::StepUp,
            "stepdown" => Self::StepDown,
            "sensor" => Self::Sensor,
            _ => return Err(UnknownRfCommand(token.to_string())),
        };
        Ok(cmd)
    }
}
