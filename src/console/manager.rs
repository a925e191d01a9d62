//! Bounded pool of console sessions.
//!
//! [`SessionManager`] owns a fixed number of session slots. With one slot
//! it behaves as an exclusive console: a second connection is told another
//! session is active and dropped. With more, new connections take the
//! first free slot and are turned away with a short notice when the pool
//! is full. Existing sessions are never affected by a rejection.

use std::time::{Duration, Instant};

use super::dispatch::Dispatcher;
use super::format::OutputFormat;
use super::record::Record;
use super::session::{CloseReason, Session, SessionState};
use super::session_id::SessionId;
use super::transport::Connection;
use crate::error::ConsoleError;

/// Result of offering a connection to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The connection now owns a slot.
    Accepted(SessionId),
    /// No slot was free; the connection was notified and dropped.
    Rejected,
}

/// Fixed-capacity session pool.
#[derive(Debug)]
pub struct SessionManager<C> {
    slots: Vec<Option<Session<C>>>,
    format: OutputFormat,
    idle_timeout: Duration,
    buffer_capacity: usize,
}

impl<C: Connection> SessionManager<C> {
    /// Creates a pool of `max_sessions` slots (at least one).
    #[must_use]
    pub fn new(
        max_sessions: usize,
        format: OutputFormat,
        idle_timeout: Duration,
        buffer_capacity: usize,
    ) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(max_sessions.max(1), || None);
        Self {
            slots,
            format,
            idle_timeout,
            buffer_capacity,
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns `true` if at least one session can receive broadcasts.
    #[must_use]
    pub fn has_listeners(&self) -> bool {
        self.slots.iter().flatten().any(|s| !s.is_closing())
    }

    /// Places `conn` in the first free slot and greets it with `greeting`,
    /// or turns it away if the pool is full.
    pub fn accept(&mut self, mut conn: C, now: Instant, greeting: &[Record]) -> AcceptOutcome {
        let format = self.format;
        let capacity = self.capacity();
        let peer = conn.peer_addr();
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) else {
            let err = if capacity == 1 {
                ConsoleError::SessionBusy
            } else {
                ConsoleError::ConsoleFull(capacity)
            };
            let notice = format.render(&Record::from(&err));
            if let Err(e) = conn.try_write(notice.as_bytes()) {
                tracing::debug!(error = %e, "failed to send rejection notice");
            }
            tracing::info!(?peer, capacity, "console full, connection rejected");
            return AcceptOutcome::Rejected;
        };

        let mut session = Session::new(conn, self.buffer_capacity, now);
        let id = session.id();
        session.write_str(&format.render_all(greeting));
        if let Some(prompt) = format.prompt() {
            session.write_str(prompt);
        }
        *slot = Some(session);
        tracing::info!(session = %id, ?peer, "console session opened");
        self.reap();
        AcceptOutcome::Accepted(id)
    }

    /// One service pass: flush pending output, drain input through the
    /// dispatcher, enforce the idle timeout, then drop closed sessions.
    pub fn service(&mut self, now: Instant, dispatcher: &Dispatcher) {
        let format = self.format;
        let idle_timeout = self.idle_timeout;
        for session in self.slots.iter_mut().flatten() {
            session.flush();
            for line in session.read_lines(now) {
                let reply = dispatcher.dispatch(&line);
                session.write_str(&format.render_all(&reply.records));
                if reply.close {
                    session.close(CloseReason::Quit);
                    break;
                }
                if let Some(prompt) = format.prompt() {
                    session.write_str(prompt);
                }
            }
            if !session.is_closing() && session.idle_for(now) > idle_timeout {
                session.write_str(&format.render(&Record::Bye {
                    reason: Some(CloseReason::IdleTimeout.as_str()),
                }));
                session.close(CloseReason::IdleTimeout);
            }
        }
        self.reap();
    }

    /// Writes `records` to every session that is not closing.
    pub fn broadcast(&mut self, records: &[Record]) {
        if records.is_empty() {
            return;
        }
        let mut text = self.format.render_all(records);
        if let Some(prompt) = self.format.prompt() {
            text.push_str(prompt);
        }
        let mut delivered = 0usize;
        for session in self.slots.iter_mut().flatten() {
            if session.is_closing() {
                continue;
            }
            session.write_str(&text);
            delivered += 1;
        }
        tracing::debug!(records = records.len(), sessions = delivered, "broadcast");
        self.reap();
    }

    /// Says goodbye to and closes every session.
    pub fn close_all(&mut self, reason: CloseReason) {
        let bye = self.format.render(&Record::Bye {
            reason: Some(reason.as_str()),
        });
        for session in self.slots.iter_mut().flatten() {
            session.write_str(&bye);
            session.close(reason);
        }
        self.reap();
    }

    /// Frees the slot of every closing session after a last flush attempt.
    fn reap(&mut self) {
        for slot in &mut self.slots {
            let Some(session) = slot.as_mut() else {
                continue;
            };
            if let SessionState::Closing(reason) = session.state() {
                session.flush();
                tracing::info!(
                    session = %session.id(),
                    reason = reason.as_str(),
                    "console session closed"
                );
                *slot = None;
            }
        }
    }
}
