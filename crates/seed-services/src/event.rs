//! Events consumed by the daemon's event loop.

use seed_core::Node;
use tokio::sync::mpsc;

/// A proposal to the event loop. Only the loop applies these.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Probe the node at the round-robin cursor.
    ProbeTick,
    /// Outcome of a probe started by an earlier `ProbeTick`.
    ProbeResult { alive: bool, node: Node },
    /// Add (`present = true`) or remove (`present = false`) a node.
    MembershipChange { node: Node, present: bool },
}

/// Unbounded: producers never wait on the loop. A flood of requests grows
/// the queue without limit.
pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Create the event channel.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
