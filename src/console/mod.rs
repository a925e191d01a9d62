//! Console layer: everything between raw connection bytes and the device
//! controller.
//!
//! - [`LineFramer`]: bytes to lines, with backspace editing
//! - [`command`]: tokenizer and verb table
//! - [`handlers`] and [`Dispatcher`]: line to [`Record`]s
//! - [`OutputFormat`]: records to CRLF-terminated wire text
//! - [`Session`] and [`SessionManager`]: per-connection state and the pool
//! - [`DiffEngine`]: registry changes to `update`/`removed` broadcasts
//! - [`Console`]: the single-threaded core tying them together

pub mod command;
pub mod diff;
pub mod dispatch;
mod engine;
pub mod format;
pub mod framer;
pub mod handlers;
pub mod manager;
pub mod record;
pub mod session;
pub mod session_id;
#[cfg(test)]
mod testing;
pub mod transport;

pub use diff::DiffEngine;
pub use dispatch::{Dispatcher, Reply};
pub use engine::Console;
pub use format::OutputFormat;
pub use framer::LineFramer;
pub use manager::{AcceptOutcome, SessionManager};
pub use record::{CommandAck, GroupView, HelpEntry, Record};
pub use session::{CloseReason, Session, SessionState};
pub use session_id::SessionId;
pub use transport::{Connection, TcpConnection};
