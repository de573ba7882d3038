//! seed-core — node model, wire format, and configuration shared by every
//! seed crate. All other seed crates depend on this one.

pub mod config;
pub mod geo;
pub mod node;
pub mod wire;

pub use config::SeedConfig;
pub use node::{Location, Node, NodeAddress, NodeId};
pub use wire::{Request, Response, Status, WireError};
