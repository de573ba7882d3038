//! Node model — identity and reachability of one peer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-supplied opaque identifier. Unique within the registry.
///
/// Peers may send either a JSON string or a JSON number; the id is kept
/// and echoed back in the form it arrived. A number never equals a string,
/// so `1234` and `"1234"` are different nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Number(n) => write!(f, "{n}"),
            NodeId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Text(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId::Text(s)
    }
}

impl From<u64> for NodeId {
    fn from(n: u64) -> Self {
        NodeId::Number(n.into())
    }
}

impl From<i64> for NodeId {
    fn from(n: i64) -> Self {
        NodeId::Number(n.into())
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        matches!(self, NodeId::Text(s) if s == other)
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Where a peer accepts connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeAddress {
    pub ip: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bare IPv6 literals need brackets to be dialable as host:port.
        if self.ip.contains(':') && !self.ip.starts_with('[') {
            write!(f, "[{}]:{}", self.ip, self.port)
        } else {
            write!(f, "{}:{}", self.ip, self.port)
        }
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
}

impl Location {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

/// A registered peer.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub address: NodeAddress,
    /// Present only when the peer supplied both latitude and longitude.
    pub location: Option<Location>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, address: NodeAddress, location: Option<Location>) -> Self {
        Self {
            id: id.into(),
            address,
            location,
        }
    }
}
