//! Domain layer: device identifiers, the shade/group model, RF commands,
//! and the controller capability the console is built against.
//!
//! The console core depends only on [`ShadeController`]. [`MemoryRegistry`]
//! is the bundled implementation used by the binary and the tests.

pub mod controller;
pub mod device_id;
pub mod memory_registry;
pub mod rf_command;
pub mod shade;

pub use controller::{CommandTarget, ShadeController};
pub use device_id::{GroupId, SENTINEL_ID, SLOT_COUNT, ShadeId};
pub use memory_registry::{MemoryRegistry, RegistrySeed, SentCommand};
pub use rf_command::RfCommand;
pub use shade::{Group, Shade, ShadeView, Tilt, TiltView};
