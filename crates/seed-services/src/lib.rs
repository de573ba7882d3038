//! seed-services — registry state and the pure logic that runs over it.
//!
//! Nothing in this crate performs I/O. The daemon owns the registry on its
//! event loop and hands snapshots to everything else.

pub mod event;
pub mod registry;
pub mod selection;

pub use event::{Event, EventReceiver, EventSender};
pub use registry::{NodeRegistry, RegistrySnapshot, SnapshotReceiver, SnapshotSender};
pub use selection::{nearest, random_excluding, select_seed};
