//! Event loop — the only writer of the node registry.
//!
//! Every mutation arrives as an [`Event`] on one unbounded channel and is
//! applied in arrival order by a single task, so the registry needs no
//! lock. After each change the loop publishes a fresh snapshot for
//! readers. The loop never performs network I/O itself: probes run in
//! their own tasks and report back through the same channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use seed_core::Node;
use seed_services::{Event, EventReceiver, EventSender, NodeRegistry, SnapshotSender};

use crate::prober::{self, ProbeTimeouts};

pub struct EventLoop {
    registry: NodeRegistry,
    events: EventReceiver,
    /// Handed to probers so they can report back.
    events_tx: EventSender,
    snapshots: SnapshotSender,
    timeouts: ProbeTimeouts,
    shutdown: broadcast::Receiver<()>,
}

impl EventLoop {
    pub fn new(
        events: EventReceiver,
        events_tx: EventSender,
        snapshots: SnapshotSender,
        timeouts: ProbeTimeouts,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            registry: NodeRegistry::new(),
            events,
            events_tx,
            snapshots,
            timeouts,
            shutdown,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        tracing::info!("event loop started");

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!(nodes = self.registry.len(), "event loop shutting down");
                    return Ok(());
                }

                event = self.events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => {
                        tracing::warn!("all event senders dropped, event loop exiting");
                        return Ok(());
                    }
                },
            }
        }
    }

    fn handle(&mut self, event: Event) {
        tracing::trace!(?event, "popped event");

        match event {
            Event::ProbeTick => self.launch_probe(),

            Event::ProbeResult { alive: true, node } => {
                self.registry.advance_cursor();
                tracing::trace!(node_id = %node.id, cursor = self.registry.cursor(), "cursor advanced");
                self.publish();
            }

            Event::ProbeResult { alive: false, node } => self.remove(&node, "probe failed"),

            Event::MembershipChange {
                node,
                present: true,
            } => self.add(node),

            Event::MembershipChange {
                node,
                present: false,
            } => self.remove(&node, "deregistered"),
        }
    }

    fn launch_probe(&self) {
        let Some(node) = self.registry.at_cursor() else {
            tracing::trace!("registry empty, nothing to probe");
            return;
        };

        tokio::spawn(prober::probe_node(
            node.clone(),
            self.timeouts,
            self.events_tx.clone(),
        ));
    }

    fn add(&mut self, node: Node) {
        let (id, addr) = (node.id.clone(), node.address.clone());
        if self.registry.insert(node) {
            tracing::info!(node_id = %id, %addr, nodes = self.registry.len(), "added node");
            self.publish();
        } else {
            tracing::debug!(node_id = %id, %addr, "node already registered, ignoring");
        }
    }

    fn remove(&mut self, node: &Node, reason: &'static str) {
        match self.registry.remove(&node.id) {
            Some(removed) => {
                tracing::info!(
                    node_id = %removed.id,
                    addr = %removed.address,
                    reason,
                    nodes = self.registry.len(),
                    "removed node"
                );
                self.publish();
            }
            None => tracing::debug!(node_id = %node.id, reason, "node already gone"),
        }
    }

    fn publish(&self) {
        self.snapshots
            .send_replace(Arc::new(self.registry.snapshot()));
    }
}

/// Enqueue a `ProbeTick` every `period`, starting one period from now.
///
/// Exits when the event loop is gone or shutdown fires.
pub async fn probe_ticker(
    events: EventSender,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.recv() => return Ok(()),

            _ = interval.tick() => {
                if events.send(Event::ProbeTick).is_err() {
                    tracing::debug!("event loop gone, probe ticker exiting");
                    return Ok(());
                }
            }
        }
    }
}
