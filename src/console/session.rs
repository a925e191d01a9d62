//! One console session: connection, line framer, idle clock, outbox.
//!
//! Lifecycle: a slot with no session is idle. Accepting a connection
//! creates a session in [`SessionState::Connected`]; the first received
//! byte moves it to [`SessionState::Active`]. Quit, idle timeout, transport
//! failure and server shutdown all lead to [`SessionState::Closing`], after
//! which the manager flushes and drops it. Closing is idempotent and keeps
//! the first reason.

use std::io;
use std::time::{Duration, Instant};

use super::framer::LineFramer;
use super::session_id::SessionId;
use super::transport::Connection;
use crate::error::ConsoleError;

/// Upper bound on unsent output per session.
pub const MAX_OUTBOX: usize = 64 * 1024;

/// Upper bound on bytes taken from one connection per service pass.
pub const MAX_READ_PER_PASS: usize = 4 * 1024;

const READ_CHUNK: usize = 256;

/// Why a session is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The operator sent `exit`.
    Quit,
    /// No input arrived within the idle timeout.
    IdleTimeout,
    /// The peer disconnected or a read/write failed.
    Transport,
    /// The server is stopping.
    Shutdown,
}

impl CloseReason {
    /// Short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::IdleTimeout => "timeout",
            Self::Transport => "transport",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, nothing received yet.
    Connected,
    /// At least one byte received.
    Active,
    /// Will be flushed and dropped at the end of the current pass.
    Closing(CloseReason),
}

/// A single operator connection.
#[derive(Debug)]
pub struct Session<C> {
    id: SessionId,
    conn: C,
    framer: LineFramer,
    last_activity: Instant,
    state: SessionState,
    outbox: Vec<u8>,
    broken: bool,
}

impl<C: Connection> Session<C> {
    /// Wraps a freshly accepted connection.
    #[must_use]
    pub fn new(conn: C, buffer_capacity: usize, now: Instant) -> Self {
        Self {
            id: SessionId::new(),
            conn,
            framer: LineFramer::new(buffer_capacity),
            last_activity: now,
            state: SessionState::Connected,
            outbox: Vec::new(),
            broken: false,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` once the session has been asked to close.
    #[must_use]
    pub const fn is_closing(&self) -> bool {
        matches!(self.state, SessionState::Closing(_))
    }

    /// Time since the last received byte.
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Bytes written but not yet accepted by the transport.
    #[must_use]
    pub fn pending_output(&self) -> usize {
        self.outbox.len()
    }

    /// Takes up to [`MAX_READ_PER_PASS`] bytes the transport already holds
    /// and returns the lines completed by them. Never waits; anything left
    /// over is read on the next pass.
    pub fn read_lines(&mut self, now: Instant) -> Vec<String> {
        let mut lines = Vec::new();
        let mut received = false;
        let mut budget = MAX_READ_PER_PASS;
        let mut buf = [0u8; READ_CHUNK];
        while !self.broken && budget > 0 {
            let chunk = buf.get_mut(..budget.min(READ_CHUNK)).unwrap_or_default();
            match self.conn.try_read(chunk) {
                Ok(0) => {
                    tracing::debug!(session = %self.id, "peer closed connection");
                    self.close(CloseReason::Transport);
                    break;
                }
                Ok(n) => {
                    received = true;
                    budget = budget.saturating_sub(n);
                    lines.extend(self.framer.feed(chunk.get(..n).unwrap_or_default()));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.fail(e.into());
                    break;
                }
            }
        }
        if received {
            self.last_activity = now;
            if self.state == SessionState::Connected {
                self.state = SessionState::Active;
            }
        }
        lines
    }

    /// Queues `text` and pushes as much as possible to the transport.
    pub fn write_str(&mut self, text: &str) {
        if self.broken || text.is_empty() {
            return;
        }
        self.outbox.extend_from_slice(text.as_bytes());
        self.flush();
    }

    /// Retries pending output. A backlog past [`MAX_OUTBOX`] fails the
    /// session.
    pub fn flush(&mut self) {
        while !self.broken && !self.outbox.is_empty() {
            match self.conn.try_write(&self.outbox) {
                Ok(0) => self.fail(io::Error::from(io::ErrorKind::WriteZero).into()),
                Ok(n) => {
                    self.outbox.drain(..n.min(self.outbox.len()));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => self.fail(e.into()),
            }
        }
        if self.outbox.len() > MAX_OUTBOX {
            self.fail(ConsoleError::Backlog(MAX_OUTBOX));
        }
    }

    /// Requests closure. Only the first reason is kept.
    pub fn close(&mut self, reason: CloseReason) {
        if self.is_closing() {
            return;
        }
        self.state = SessionState::Closing(reason);
        self.framer.reset();
    }

    fn fail(&mut self, err: ConsoleError) {
        tracing::warn!(session = %self.id, error = %err, "session transport failure");
        self.broken = true;
        self.outbox.clear();
        self.close(CloseReason::Transport);
    }
}
