//! Line tokenizing and verb lookup.

/// Maximum tokens kept from one line (verb plus four arguments).
pub const MAX_TOKENS: usize = 5;

/// Fixed console verb set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// `help`, `?`
    Help,
    /// `list`, `status`
    List,
    /// `groups`
    Groups,
    /// `shade`, `get`, `show`
    Shade,
    /// `target`, `set`, `goto`
    Target,
    /// `cmd`, `send`, `control`
    Cmd,
    /// `group`
    Group,
    /// `exit`, `quit`, `bye`
    Exit,
}

impl Verb {
    /// Case-insensitive lookup against the verb table.
    #[must_use]
    pub fn lookup(token: &str) -> Option<Self> {
        let verb = match token.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "list" | "status" => Self::List,
            "groups" => Self::Groups,
            "shade" | "get" | "show" => Self::Shade,
            "target" | "set" | "goto" => Self::Target,
            "cmd" | "send" | "control" => Self::Cmd,
            "group" => Self::Group,
            "exit" | "quit" | "bye" => Self::Exit,
            _ => return None,
        };
        Some(verb)
    }
}

/// One parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    /// Resolved verb.
    pub verb: Verb,
    /// Positional arguments following the verb.
    pub args: Vec<&'a str>,
}

impl<'a> Command<'a> {
    /// Returns the argument at `index`, if present.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }
}

/// Result of parsing a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// Blank line.
    Empty,
    /// A recognized command.
    Command(Command<'a>),
    /// First token matched nothing.
    Unrecognized(&'a str),
}

/// Splits a line on whitespace runs, keeping at most [`MAX_TOKENS`] tokens.
#[must_use]
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().take(MAX_TOKENS).collect()
}

/// Parses a line into a command.
///
/// A line whose first token is not a verb but starts with a digit is read
/// as `shade <id> ...`, so `3 up` means `shade 3 up`.
#[must_use]
pub fn parse(line: &str) -> ParsedLine<'_> {
    let tokens = tokenize(line);
    let Some((&first, rest)) = tokens.split_first() else {
        return ParsedLine::Empty;
    };
    if let Some(verb) = Verb::lookup(first) {
        return ParsedLine::Command(Command {
            verb,
            args: rest.to_vec(),
        });
    }
    if first.starts_with(|c: char| c.is_ascii_digit()) {
        return ParsedLine::Command(Command {
            verb: Verb::Shade,
            args: tokens,
        });
    }
    ParsedLine::Unrecognized(first)
}

/// Lenient integer parse: optional sign then leading digits.
///
/// Non-numeric input yields 0 and trailing garbage is ignored, so `"12ab"`
/// is 12. Saturates instead of overflowing.
#[must_use]
pub fn parse_lenient(token: &str) -> i64 {
    let token = token.trim_start();
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, token.get(1..).unwrap_or_default()),
        Some(b'+') => (false, token.get(1..).unwrap_or_default()),
        _ => (false, token),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative { -magnitude } else { magnitude }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_resolve_to_the_same_verb() {
        for (a, b) in [
            ("help", "?"),
            ("list", "status"),
            ("shade", "show"),
            ("get", "shade"),
            ("target", "goto"),
            ("set", "target"),
            ("cmd", "control"),
            ("send", "cmd"),
            ("exit", "bye"),
            ("quit", "exit"),
        ] {
            assert_eq!(Verb::lookup(a), Verb::lookup(b), "{a} vs {b}");
            assert!(Verb::lookup(a).is_some());
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(Verb::lookup("LIST"), Some(Verb::List));
        assert_eq!(Verb::lookup("Quit"), Some(Verb::Exit));
    }

    #[test]
    fn tokenize_collapses_whitespace_runs() {
        assert_eq!(tokenize("cmd   3 \t up"), vec!["cmd", "3", "up"]);
    }

    #[test]
    fn tokenize_drops_excess_tokens() {
        assert_eq!(tokenize("a b c d e f g").len(), MAX_TOKENS);
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(parse("   "), ParsedLine::Empty);
    }

    #[test]
    fn numeric_first_token_is_implicit_shade() {
        let ParsedLine::Command(cmd) = parse("3 up 2") else {
            panic!("expected command");
        };
        assert_eq!(cmd.verb, Verb::Shade);
        assert_eq!(cmd.args, vec!["3", "up", "2"]);
    }

    #[test]
    fn unknown_verb_is_unrecognized() {
        assert_eq!(parse("dance 3"), ParsedLine::Unrecognized("dance"));
    }

    #[test]
    fn lenient_parse_matches_console_expectations() {
        assert_eq!(parse_lenient("150"), 150);
        assert_eq!(parse_lenient("-20"), -20);
        assert_eq!(parse_lenient("abc"), 0);
        assert_eq!(parse_lenient("42abc"), 42);
        assert_eq!(parse_lenient("+7"), 7);
        assert_eq!(parse_lenient(""), 0);
        assert_eq!(parse_lenient("99999999999999999999999"), i64::MAX);
    }
}
