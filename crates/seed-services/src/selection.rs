//! Seed selection — which registered peer to hand a joining node.
//!
//! With coordinates: the geographically nearest other node. Without (or
//! when nobody else has coordinates): a random other node.

use rand::Rng;
use seed_core::geo::haversine_km;
use seed_core::{Location, Node, NodeId};

/// Choose a seed for the caller `exclude`.
pub fn select_seed<'a, Q, R>(
    nodes: &'a [Node],
    exclude: &Q,
    origin: Option<Location>,
    rng: &mut R,
) -> Option<&'a Node>
where
    Q: ?Sized,
    NodeId: PartialEq<Q>,
    R: Rng + ?Sized,
{
    origin
        .and_then(|origin| nearest(nodes, exclude, origin))
        .or_else(|| random_excluding(nodes, exclude, rng))
}

/// Node with coordinates closest to `origin`, skipping `exclude`.
///
/// Ties go to the earliest node in registry order.
pub fn nearest<'a, Q>(nodes: &'a [Node], exclude: &Q, origin: Location) -> Option<&'a Node>
where
    Q: ?Sized,
    NodeId: PartialEq<Q>,
{
    let mut best: Option<(&Node, f64)> = None;
    for node in nodes.iter().filter(|n| &n.id != exclude) {
        let Some(location) = node.location else {
            continue;
        };
        let distance = haversine_km(origin, location);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((node, distance));
        }
    }
    best.map(|(node, _)| node)
}

/// A random node other than `exclude`.
///
/// Picks a slot uniformly; if it holds the caller, the following slot is
/// used instead.
pub fn random_excluding<'a, Q, R>(
    nodes: &'a [Node],
    exclude: &Q,
    rng: &mut R,
) -> Option<&'a Node>
where
    Q: ?Sized,
    NodeId: PartialEq<Q>,
    R: Rng + ?Sized,
{
    if !nodes.iter().any(|n| &n.id != exclude) {
        return None;
    }
    let index = rng.gen_range(0..nodes.len());
    if &nodes[index].id == exclude {
        // Ids are unique, so with another node present the next slot is not the caller.
        Some(&nodes[(index + 1) % nodes.len()])
    } else {
        Some(&nodes[index])
    }
}
