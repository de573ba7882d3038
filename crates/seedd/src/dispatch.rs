//! Routes decoded requests to registry reads or mutation proposals.
//!
//! `add_node` and `dead_node` only enqueue an event and answer OK at once;
//! the caller learns nothing about whether the change was applied.
//! `get_seed` reads the latest published snapshot and never mutates.

use rand::Rng;

use seed_core::wire::NodeBody;
use seed_core::{Node, Request, Response};
use seed_services::{select_seed, Event, EventSender, SnapshotReceiver};

pub struct RpcDispatcher {
    events: EventSender,
    snapshots: SnapshotReceiver,
}

impl RpcDispatcher {
    pub fn new(events: EventSender, snapshots: SnapshotReceiver) -> Self {
        Self { events, snapshots }
    }

    pub fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::AddNode(body) => {
                self.propose(body.into_node(), true);
                Response::ok()
            }
            Request::DeadNode(body) => {
                self.propose(body.into_node(), false);
                Response::ok()
            }
            Request::GetSeed(body) => self.get_seed(&body, &mut rand::thread_rng()),
            Request::Poll => Response::ok(),
        }
    }

    fn propose(&self, node: Node, present: bool) {
        let id = node.id.clone();
        if self
            .events
            .send(Event::MembershipChange { node, present })
            .is_err()
        {
            tracing::warn!(node_id = %id, present, "event loop gone, membership change dropped");
        }
    }

    fn get_seed<R: Rng + ?Sized>(&self, body: &NodeBody, rng: &mut R) -> Response {
        let snapshot = self.snapshots.borrow().clone();

        let address = body.address();
        if snapshot.conflicts_with(&body.id, &address) {
            tracing::info!(node_id = %body.id, %address, "id registered under another address");
            return Response::conflict();
        }

        match select_seed(&snapshot.nodes, &body.id, body.location(), rng) {
            Some(seed) => {
                tracing::info!(node_id = %body.id, seed = %seed.id, "sending seed");
                Response::seed(seed)
            }
            None => {
                tracing::info!(node_id = %body.id, "no seed available");
                Response::seed_not_found()
            }
        }
    }
}
