//! HTTP API handlers — exposes registry snapshots as JSON.

pub mod nodes;
pub mod status;

use std::time::Instant;

use seed_services::SnapshotReceiver;

#[derive(Clone)]
pub struct ApiState {
    /// Latest registry snapshot published by the event loop.
    pub snapshots: SnapshotReceiver,
    pub started_at: Instant,
    /// Port of the peer RPC listener.
    pub listen_port: u16,
    pub polling_interval_ms: u64,
}

pub use nodes::{handle_node, handle_nodes};
pub use status::handle_status;
