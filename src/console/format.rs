//! Record rendering for the two console dialects.
//!
//! A deployment picks one [`OutputFormat`] for every session. Both render
//! the same information per record; every emitted line ends in CRLF.

use std::fmt::Write as _;
use std::str::FromStr;

use super::record::{CommandAck, GroupView, Record};
use crate::domain::ShadeView;
use crate::error::ConsoleError;

const CRLF: &str = "\r\n";

/// Wire dialect used by every session of a console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Fixed-width human-readable lines with a `> ` prompt.
    Text,
}

impl FromStr for OutputFormat {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "structured" => Ok(Self::Json),
            "text" | "plain" => Ok(Self::Text),
            other => Err(ConsoleError::Config(format!(
                "unknown console format '{other}' (expected json or text)"
            ))),
        }
    }
}

impl OutputFormat {
    /// Renders one record as one or more CRLF-terminated lines.
    #[must_use]
    pub fn render(self, record: &Record) -> String {
        match self {
            Self::Json => {
                let mut line = serde_json::to_string(record).unwrap_or_default();
                line.push_str(CRLF);
                line
            }
            Self::Text => render_text(record),
        }
    }

    /// Renders a batch of records back to back.
    #[must_use]
    pub fn render_all(self, records: &[Record]) -> String {
        records.iter().map(|r| self.render(r)).collect()
    }

    /// Input prompt written after each reply, if the dialect has one.
    #[must_use]
    pub const fn prompt(self) -> Option<&'static str> {
        match self {
            Self::Json => None,
            Self::Text => Some("> "),
        }
    }
}

/// Fixed-width shade line, plus an indented tilt line when capable.
fn shade_line(out: &mut String, view: &ShadeView) {
    let _ = write!(
        out,
        "{:>3} {:<20} pos:{:>3}% tgt:{:>3}% dir:{} addr:{} flags:0x{:02X}{CRLF}",
        view.id,
        view.name,
        view.position,
        view.target,
        view.direction,
        view.remote_address,
        view.flags
    );
    if let Some(tilt) = view.tilt {
        let _ = write!(
            out,
            "    tilt pos:{:>3}% tgt:{:>3}% dir:{}{CRLF}",
            tilt.position, tilt.target, tilt.direction
        );
    }
}

fn group_line(out: &mut String, group: &GroupView) {
    let members: Vec<String> = group.members.iter().map(ToString::to_string).collect();
    let _ = write!(
        out,
        "{:>3} {:<20} repeats:{} members:{}{CRLF}",
        group.id,
        group.name,
        group.repeats,
        members.join(",")
    );
}

fn ack_line(out: &mut String, ack: &CommandAck) {
    let recipient = match (ack.id, ack.group) {
        (Some(id), _) => format!("shade {id}"),
        (None, Some(gid)) => format!("group {gid}"),
        (None, None) => String::from("device"),
    };
    let _ = match (ack.target, ack.cmd) {
        (Some(target), _) => write!(out, "Moving {recipient} to {target}%"),
        (None, Some(cmd)) => write!(out, "Sent {cmd} to {recipient}"),
        (None, None) => write!(out, "Command accepted for {recipient}"),
    };
    match (ack.repeat, ack.step) {
        (Some(repeat), Some(step)) => {
            let _ = write!(out, " (repeat {repeat}, step {step})");
        }
        (Some(repeat), None) => {
            let _ = write!(out, " (repeat {repeat})");
        }
        _ => {}
    }
    out.push_str(CRLF);
}

fn render_text(record: &Record) -> String {
    let mut out = String::new();
    match record {
        Record::Welcome { msg } | Record::Info { msg } => {
            out.push_str(msg);
            out.push_str(CRLF);
        }
        Record::Help { commands } => {
            out.push_str("Commands:");
            out.push_str(CRLF);
            for entry in commands {
                let _ = write!(out, "  {:<34} {}{CRLF}", entry.usage, entry.summary);
            }
        }
        Record::State(view) => shade_line(&mut out, view),
        Record::Update(view) => {
            out.push_str("[update] ");
            shade_line(&mut out, view);
        }
        Record::Removed { id, name } => {
            let _ = write!(out, "[removed] {id:>3} {name}{CRLF}");
        }
        Record::Group(group) => group_line(&mut out, group),
        Record::Command(ack) => ack_line(&mut out, ack),
        Record::Error { code, msg } => {
            let _ = write!(out, "error {code}: {msg}{CRLF}");
        }
        Record::Bye { reason: None } => {
            out.push_str("Closing connection.");
            out.push_str(CRLF);
        }
        Record::Bye {
            reason: Some("timeout"),
        } => {
            out.push_str("Session timed out.");
            out.push_str(CRLF);
        }
        Record::Bye {
            reason: Some(reason),
        } => {
            let _ = write!(out, "Closing connection ({reason}).{CRLF}");
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{RfCommand, Shade, ShadeId, Tilt};

    fn shade(raw: u8) -> Shade {
        let Some(id) = ShadeId::new(raw) else {
            panic!("valid id");
        };
        let mut shade = Shade::new(id, "Living Room");
        shade.position = 25;
        shade.target = 75;
        shade.direction = 1;
        shade.remote_address = 1234;
        shade.flags = 0x0A;
        shade
    }

    #[test]
    fn json_lines_end_in_crlf() {
        let out = OutputFormat::Json.render(&Record::State(shade(3).view()));
        assert!(out.ends_with("\r\n"));
        assert_eq!(out.matches("\r\n").count(), 1);
        assert!(out.contains(r#""pos":25"#));
        assert!(out.contains(r#""flags":10"#));
    }

    #[test]
    fn text_shade_line_is_fixed_width() {
        let out = OutputFormat::Text.render(&Record::State(shade(3).view()));
        assert_eq!(
            out,
            "  3 Living Room          pos: 25% tgt: 75% dir:1 addr:1234 flags:0x0A\r\n"
        );
    }

    #[test]
    fn text_adds_tilt_line_when_capable() {
        let mut s = shade(4);
        s.tilt = Some(Tilt {
            position: 5,
            target: 50,
            direction: -1,
        });
        let out = OutputFormat::Text.render(&Record::Update(s.view()));
        let lines: Vec<&str> = out.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.first().is_some_and(|l| l.starts_with("[update]")));
        assert_eq!(lines.get(1).copied(), Some("    tilt pos:  5% tgt: 50% dir:-1"));
    }

    #[test]
    fn both_formats_carry_the_same_shade_fields() {
        let mut s = shade(9);
        s.tilt = Some(Tilt::default());
        let view = s.view();
        let json = OutputFormat::Json.render(&Record::State(view.clone()));
        let text = OutputFormat::Text.render(&Record::State(view));
        for needle in ["Living Room", "1234", "25", "75"] {
            assert!(json.contains(needle), "json missing {needle}");
            assert!(text.contains(needle), "text missing {needle}");
        }
        assert!(json.contains("tiltPos") && text.contains("tilt pos"));
    }

    #[test]
    fn text_ack_describes_command() {
        let Some(id) = ShadeId::new(2) else {
            panic!("valid id");
        };
        let out = OutputFormat::Text.render(&Record::Command(CommandAck::shade(
            id,
            RfCommand::Up,
            3,
            Some(5),
        )));
        assert_eq!(out, "Sent up to shade 2 (repeat 3, step 5)\r\n");
    }

    #[test]
    fn text_bye_distinguishes_timeout() {
        assert_eq!(
            OutputFormat::Text.render(&Record::Bye {
                reason: Some("timeout")
            }),
            "Session timed out.\r\n"
        );
        assert_eq!(
            OutputFormat::Text.render(&Record::Bye { reason: None }),
            "Closing connection.\r\n"
        );
    }

    #[test]
    fn format_parses_from_config_strings() {
        assert_eq!("JSON".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>().ok(), Some(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn only_text_has_a_prompt() {
        assert_eq!(OutputFormat::Text.prompt(), Some("> "));
        assert_eq!(OutputFormat::Json.prompt(), None);
    }
}
