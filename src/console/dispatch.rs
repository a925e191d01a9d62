//! Command dispatcher: line in, records out.

use std::sync::Arc;

use super::command::{ParsedLine, Verb, parse};
use super::handlers;
use super::record::Record;
use crate::domain::ShadeController;
use crate::error::ConsoleError;

/// Banner sent as the `welcome` record.
pub const WELCOME_BANNER: &str = "Shade console ready. Type 'help' for commands.";

/// Records produced for one input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Records to write, in order.
    pub records: Vec<Record>,
    /// Close the session once the records are written.
    pub close: bool,
}

impl Reply {
    fn records(records: Vec<Record>) -> Self {
        Self {
            records,
            close: false,
        }
    }
}

/// Parses lines and runs them against the controller.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    controller: Arc<dyn ShadeController>,
    groups_enabled: bool,
}

impl Dispatcher {
    /// Creates a dispatcher over `controller`.
    #[must_use]
    pub fn new(controller: Arc<dyn ShadeController>, groups_enabled: bool) -> Self {
        Self {
            controller,
            groups_enabled,
        }
    }

    /// The controller commands are executed against.
    #[must_use]
    pub fn controller(&self) -> &dyn ShadeController {
        self.controller.as_ref()
    }

    /// Welcome banner followed by the full shade listing.
    #[must_use]
    pub fn greeting(&self) -> Vec<Record> {
        let mut records = vec![Record::Welcome {
            msg: WELCOME_BANNER.to_string(),
        }];
        records.extend(handlers::list_shades(self.controller()));
        records
    }

    /// Executes one line. Never fails: errors become `error` records.
    #[must_use]
    pub fn dispatch(&self, line: &str) -> Reply {
        let command = match parse(line) {
            ParsedLine::Empty => return Reply::default(),
            ParsedLine::Unrecognized(token) => {
                tracing::debug!(token, "unrecognized command");
                return Reply::records(vec![ConsoleError::UnrecognizedCommand.into()]);
            }
            ParsedLine::Command(command) => command,
        };
        tracing::debug!(verb = ?command.verb, args = ?command.args, "dispatching");

        let controller = self.controller();
        let result = match command.verb {
            Verb::Help => Ok(handlers::help(self.groups_enabled)),
            Verb::List => Ok(handlers::list_shades(controller)),
            Verb::Groups => handlers::list_groups(controller, self.groups_enabled),
            Verb::Shade => handlers::shade(controller, &command),
            Verb::Target => handlers::target(controller, &command),
            Verb::Cmd => handlers::send(controller, &command),
            Verb::Group => handlers::group(controller, &command, self.groups_enabled),
            Verb::Exit => {
                return Reply {
                    records: vec![Record::Bye { reason: None }],
                    close: true,
                };
            }
        };
        match result {
            Ok(records) => Reply::records(records),
            Err(err) => Reply::records(vec![err.into()]),
        }
    }
}
