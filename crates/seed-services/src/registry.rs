//! Node registry — the authoritative set of live peers.
//!
//! The registry is a plain ordered list plus a round-robin cursor. It has no
//! interior mutability: the event loop owns it, and every other task reads
//! an immutable [`RegistrySnapshot`] published through a watch channel.
//!
//! Invariants:
//!   - at most one node per id;
//!   - `cursor < len` when non-empty, `cursor == 0` when empty.

use std::sync::Arc;

use seed_core::{Node, NodeAddress, NodeId};
use tokio::sync::watch;

#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    cursor: usize,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&Node>
    where
        Q: ?Sized,
        NodeId: PartialEq<Q>,
    {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// The node the next probe should target.
    pub fn at_cursor(&self) -> Option<&Node> {
        self.nodes.get(self.cursor)
    }

    /// Append `node` unless its id is already registered.
    ///
    /// Returns false on a duplicate id. The existing entry keeps its
    /// address and location.
    pub fn insert(&mut self, node: Node) -> bool {
        if self.get(&node.id).is_some() {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Remove the node with `id`, if any, and clamp the cursor.
    pub fn remove<Q>(&mut self, id: &Q) -> Option<Node>
    where
        Q: ?Sized,
        NodeId: PartialEq<Q>,
    {
        let index = self.nodes.iter().position(|n| &n.id == id)?;
        let removed = self.nodes.remove(index);
        self.clamp_cursor();
        Some(removed)
    }

    /// Move the cursor to the next node, wrapping.
    pub fn advance_cursor(&mut self) {
        self.cursor = match self.nodes.len() {
            0 => 0,
            len => (self.cursor + 1) % len,
        };
    }

    fn clamp_cursor(&mut self) {
        self.cursor = match self.nodes.len() {
            0 => 0,
            len => self.cursor % len,
        };
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            nodes: self.nodes.clone(),
            cursor: self.cursor,
        }
    }
}

/// A consistent copy of the registry at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub nodes: Vec<Node>,
    pub cursor: usize,
}

impl RegistrySnapshot {
    pub fn get<Q>(&self, id: &Q) -> Option<&Node>
    where
        Q: ?Sized,
        NodeId: PartialEq<Q>,
    {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// True when `id` is registered under an address other than `address`.
    pub fn conflicts_with<Q>(&self, id: &Q, address: &NodeAddress) -> bool
    where
        Q: ?Sized,
        NodeId: PartialEq<Q>,
    {
        self.get(id).is_some_and(|n| &n.address != address)
    }
}

pub type SnapshotSender = watch::Sender<Arc<RegistrySnapshot>>;
pub type SnapshotReceiver = watch::Receiver<Arc<RegistrySnapshot>>;

/// Create the snapshot channel, starting from an empty registry.
pub fn snapshot_channel() -> (SnapshotSender, SnapshotReceiver) {
    watch::channel(Arc::new(RegistrySnapshot::default()))
}
