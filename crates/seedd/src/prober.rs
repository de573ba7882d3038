//! Liveness prober — one short-lived task per probe.
//!
//! Connects to a peer, sends `poll`, and waits for any reply. The outcome
//! goes back to the event loop as a `ProbeResult`. Failures are never
//! retried here; the next tick probes whatever the cursor points at.

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use seed_core::config::ProbeConfig;
use seed_core::wire::{self, RequestEnvelope};
use seed_core::{Node, NodeAddress, Request, WireError};
use seed_services::{Event, EventSender};

#[derive(Debug, Clone, Copy)]
pub struct ProbeTimeouts {
    pub connect: Duration,
    pub response: Duration,
}

impl ProbeTimeouts {
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            connect: config.connect_timeout(),
            response: config.response_timeout(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),
    #[error("no reply within {0:?}")]
    ResponseTimeout(Duration),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
    #[error("peer closed without replying")]
    EmptyReply,
}

/// Probe `node` and report the result to the event loop.
pub async fn probe_node(node: Node, timeouts: ProbeTimeouts, events: EventSender) {
    tracing::debug!(node_id = %node.id, addr = %node.address, "polling node");

    let alive = match poll(&node.address, timeouts).await {
        Ok(()) => {
            tracing::debug!(node_id = %node.id, "node is alive");
            true
        }
        Err(e) => {
            tracing::info!(node_id = %node.id, addr = %node.address, error = %e, "node is dead");
            false
        }
    };

    if events.send(Event::ProbeResult { alive, node }).is_err() {
        tracing::debug!("event loop gone, dropping probe result");
    }
}

/// One `poll` round trip. Any non-empty reply counts as alive.
pub async fn poll(address: &NodeAddress, timeouts: ProbeTimeouts) -> Result<(), ProbeError> {
    let mut stream = timeout(
        timeouts.connect,
        TcpStream::connect((address.ip.as_str(), address.port)),
    )
    .await
    .map_err(|_| ProbeError::ConnectTimeout(timeouts.connect))??;

    timeout(timeouts.response, exchange_poll(&mut stream))
        .await
        .map_err(|_| ProbeError::ResponseTimeout(timeouts.response))?
}

async fn exchange_poll(stream: &mut TcpStream) -> Result<(), ProbeError> {
    wire::write_message(stream, &RequestEnvelope::from(Request::Poll)).await?;
    let mut buf = [0u8; 256];
    match stream.read(&mut buf).await? {
        0 => Err(ProbeError::EmptyReply),
        _ => Ok(()),
    }
}
