//! # shade-console
//!
//! Line-oriented TCP console for motorized shades and shade groups.
//!
//! Operators connect with any raw TCP or telnet client, type commands, and
//! receive replies plus live `update`/`removed` broadcasts whenever a
//! shade's observable state changes. Replies are rendered either as one
//! JSON object per line or as fixed-width text, chosen per deployment.
//! The device side is reached through the [`domain::ShadeController`]
//! capability; this crate only coordinates.
//!
//! ## Architecture
//!
//! ```text
//! TCP clients
//!     │
//!     ├── serve() accept/tick loop (server.rs)
//!     │
//!     ├── SessionManager ── Session ── LineFramer (console/)
//!     ├── Dispatcher ── handlers ── Record ── OutputFormat
//!     ├── DiffEngine (snapshot table, broadcasts)
//!     │
//!     └── ShadeController (domain/)
//!             └── MemoryRegistry (bundled implementation)
//! ```

pub mod config;
pub mod console;
pub mod domain;
pub mod error;
pub mod server;
