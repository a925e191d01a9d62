//! The console core: session pool, dispatcher and diff engine driven by
//! one tick.
//!
//! [`Console`] is synchronous and never blocks. The server task calls
//! [`Console::accept`] for each new connection and [`Console::tick`] on
//! every service interval; tests call them directly with explicit
//! instants.

use std::sync::Arc;
use std::time::Instant;

use super::diff::DiffEngine;
use super::dispatch::Dispatcher;
use super::manager::{AcceptOutcome, SessionManager};
use super::session::CloseReason;
use super::transport::Connection;
use crate::config::ConsoleConfig;
use crate::domain::ShadeController;

/// Console state shared by all sessions.
#[derive(Debug)]
pub struct Console<C> {
    sessions: SessionManager<C>,
    dispatcher: Dispatcher,
    diff: DiffEngine,
}

impl<C: Connection> Console<C> {
    /// Builds a console over `controller` using the session and broadcast
    /// settings from `config`.
    #[must_use]
    pub fn new(controller: Arc<dyn ShadeController>, config: &ConsoleConfig) -> Self {
        Self {
            sessions: SessionManager::new(
                config.max_sessions,
                config.format,
                config.idle_timeout,
                config.input_buffer,
            ),
            dispatcher: Dispatcher::new(controller, config.groups_enabled),
            diff: DiffEngine::new(config.broadcast_interval),
        }
    }

    /// Offers a new connection to the session pool.
    pub fn accept(&mut self, conn: C, now: Instant) -> AcceptOutcome {
        let greeting = self.dispatcher.greeting();
        self.sessions.accept(conn, now, &greeting)
    }

    /// One service pass: every session's input, then a rate-limited diff
    /// broadcast if anyone is listening.
    pub fn tick(&mut self, now: Instant) {
        self.sessions.service(now, &self.dispatcher);
        if !self.sessions.has_listeners() {
            return;
        }
        let records = self.diff.poll(now, self.dispatcher.controller());
        self.sessions.broadcast(&records);
    }

    /// Closes every session with a `shutdown` goodbye.
    pub fn shutdown(&mut self) {
        tracing::info!(sessions = self.sessions.active_count(), "closing console sessions");
        self.sessions.close_all(CloseReason::Shutdown);
    }

    /// The session pool.
    #[must_use]
    pub const fn sessions(&self) -> &SessionManager<C> {
        &self.sessions
    }

    /// The diff engine.
    #[must_use]
    pub const fn diff(&self) -> &DiffEngine {
        &self.diff
    }
}
