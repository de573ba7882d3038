//! Seed wire format — one JSON message per connection.
//!
//! A client opens a TCP connection, writes one request envelope, reads one
//! response envelope, and the connection is closed:
//!
//! ```text
//! {"header": {"type": <op>, ...extra}, "body": {...fields}}
//! {"header": {"status": <code>, "type"?: "seed_node"}, "body": {...}}
//! ```
//!
//! There is no length prefix. A message is complete as soon as the bytes
//! read so far parse as one JSON value, so neither side has to half-close
//! the stream before the other can answer.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::node::{Location, Node, NodeAddress, NodeId};

// ── Status codes ──────────────────────────────────────────────────────────────

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;

/// Header `type` carried by every `get_seed` answer except a conflict.
pub const SEED_NODE_TYPE: &str = "seed_node";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Status {
    Ok,
    NotFound,
    Conflict,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => STATUS_OK,
            Status::NotFound => STATUS_NOT_FOUND,
            Status::Conflict => STATUS_CONFLICT,
        }
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl TryFrom<u16> for Status {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            STATUS_OK => Ok(Status::Ok),
            STATUS_NOT_FOUND => Ok(Status::NotFound),
            STATUS_CONFLICT => Ok(Status::Conflict),
            other => Err(format!("unknown status code {other}")),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("message exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("connection closed mid-message")]
    Incomplete,
    #[error("connection closed before any data")]
    Closed,
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),
    #[error("invalid body for {op}: {source}")]
    InvalidBody {
        op: &'static str,
        source: serde_json::Error,
    },
}

// ── Envelopes ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestHeader {
    #[serde(rename = "type")]
    pub kind: String,
    /// Extra header fields are accepted and ignored.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A request as it appears on the wire, before the operation is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub header: RequestHeader,
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub status: Status,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub header: ResponseHeader,
    #[serde(default)]
    pub body: Value,
}

// ── Bodies ────────────────────────────────────────────────────────────────────

/// Body of `add_node`, `dead_node`, and `get_seed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBody {
    #[serde(alias = "node_id")]
    pub id: NodeId,
    pub ip: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
}

impl NodeBody {
    pub fn new(id: impl Into<NodeId>, address: NodeAddress, location: Option<Location>) -> Self {
        Self {
            id: id.into(),
            ip: address.ip,
            port: address.port,
            lat: location.map(|l| l.lat),
            long: location.map(|l| l.long),
        }
    }

    pub fn address(&self) -> NodeAddress {
        NodeAddress::new(self.ip.clone(), self.port)
    }

    /// Both coordinates, or nothing.
    pub fn location(&self) -> Option<Location> {
        match (self.lat, self.long) {
            (Some(lat), Some(long)) => Some(Location::new(lat, long)),
            _ => None,
        }
    }

    pub fn into_node(self) -> Node {
        let location = self.location();
        Node::new(self.id, NodeAddress::new(self.ip, self.port), location)
    }
}

/// Body of a successful `get_seed` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedBody {
    pub ip: String,
    pub port: u16,
    #[serde(alias = "node_id")]
    pub id: NodeId,
}

impl From<&Node> for SeedBody {
    fn from(node: &Node) -> Self {
        Self {
            ip: node.address.ip.clone(),
            port: node.address.port,
            id: node.id.clone(),
        }
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// Every operation the seed server answers.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    AddNode(NodeBody),
    DeadNode(NodeBody),
    GetSeed(NodeBody),
    Poll,
}

impl Request {
    pub fn operation(&self) -> &'static str {
        match self {
            Request::AddNode(_) => "add_node",
            Request::DeadNode(_) => "dead_node",
            Request::GetSeed(_) => "get_seed",
            Request::Poll => "poll",
        }
    }
}

fn parse_body(op: &'static str, body: Value) -> Result<NodeBody, WireError> {
    serde_json::from_value(body).map_err(|source| WireError::InvalidBody { op, source })
}

impl TryFrom<RequestEnvelope> for Request {
    type Error = WireError;

    fn try_from(envelope: RequestEnvelope) -> Result<Self, Self::Error> {
        let RequestEnvelope { header, body } = envelope;
        match header.kind.as_str() {
            "add_node" => parse_body("add_node", body).map(Request::AddNode),
            "dead_node" => parse_body("dead_node", body).map(Request::DeadNode),
            "get_seed" => parse_body("get_seed", body).map(Request::GetSeed),
            "poll" => Ok(Request::Poll),
            _ => Err(WireError::UnknownOperation(header.kind)),
        }
    }
}

impl From<Request> for RequestEnvelope {
    fn from(request: Request) -> Self {
        let kind = request.operation().to_string();
        let body = match request {
            Request::AddNode(b) | Request::DeadNode(b) | Request::GetSeed(b) => {
                serde_json::to_value(b).unwrap_or_else(|_| Value::Object(Map::new()))
            }
            Request::Poll => Value::Object(Map::new()),
        };
        RequestEnvelope {
            header: RequestHeader {
                kind,
                extra: Map::new(),
            },
            body,
        }
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

fn empty_body() -> Value {
    Value::Object(Map::new())
}

impl Response {
    fn with_status(status: Status, kind: Option<&str>, body: Value) -> Self {
        Self {
            header: ResponseHeader {
                status,
                kind: kind.map(str::to_string),
            },
            body,
        }
    }

    /// 200 with an empty body.
    pub fn ok() -> Self {
        Self::with_status(Status::Ok, None, empty_body())
    }

    /// 200 naming the chosen seed.
    pub fn seed(node: &Node) -> Self {
        let body = serde_json::to_value(SeedBody::from(node)).unwrap_or_else(|_| empty_body());
        Self::with_status(Status::Ok, Some(SEED_NODE_TYPE), body)
    }

    /// 404: no candidate to hand out.
    pub fn seed_not_found() -> Self {
        Self::with_status(Status::NotFound, Some(SEED_NODE_TYPE), empty_body())
    }

    /// 409: the caller's id is registered under a different address.
    pub fn conflict() -> Self {
        Self::with_status(Status::Conflict, None, empty_body())
    }

    pub fn status(&self) -> Status {
        self.header.status
    }

    /// The seed named in a `get_seed` answer, if the answer was 200.
    pub fn seed_body(&self) -> Result<Option<SeedBody>, WireError> {
        if self.header.status != Status::Ok {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(self.body.clone())?))
    }
}

// ── Stream I/O ────────────────────────────────────────────────────────────────

const READ_CHUNK: usize = 1024;

/// Read exactly one JSON message from `reader`.
///
/// Reads until the buffered bytes parse as a complete `T`, the peer closes
/// the stream, or more than `max_size` bytes have arrived.
pub async fn read_message<T, R>(reader: &mut R, max_size: usize) -> Result<T, WireError>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK.min(max_size));
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(if buf.is_empty() {
                WireError::Closed
            } else {
                WireError::Incomplete
            });
        }

        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > max_size {
            return Err(WireError::TooLarge { limit: max_size });
        }

        match serde_json::from_slice::<T>(&buf) {
            Ok(message) => return Ok(message),
            Err(e) if e.is_eof() => continue,
            Err(e) => return Err(WireError::Malformed(e)),
        }
    }
}

/// Serialize `message` and write it to `writer` in full.
pub async fn write_message<T, W>(writer: &mut W, message: &T) -> Result<(), WireError>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let bytes = serde_json::to_vec(message)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
