//! One request/response exchange with a seed server over its wire protocol.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpStream;
use tokio::time::timeout;

use seed_core::wire::{self, RequestEnvelope};
use seed_core::{Request, Response};

/// Largest response the CLI is willing to read.
const MAX_RESPONSE_SIZE: usize = 64 * 1024;
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Send `request` to `server` (host:port) and wait for the answer.
pub async fn exchange(server: &str, request: Request) -> Result<Response> {
    let op = request.operation();
    timeout(EXCHANGE_TIMEOUT, send_and_receive(server, request))
        .await
        .with_context(|| format!("{} timed out after {:?}", op, EXCHANGE_TIMEOUT))?
}

async fn send_and_receive(server: &str, request: Request) -> Result<Response> {
    let op = request.operation();
    let mut stream = TcpStream::connect(server)
        .await
        .with_context(|| format!("failed to connect to seed server at {}", server))?;

    wire::write_message(&mut stream, &RequestEnvelope::from(request))
        .await
        .with_context(|| format!("failed to send {}", op))?;

    wire::read_message::<Response, _>(&mut stream, MAX_RESPONSE_SIZE)
        .await
        .with_context(|| format!("no valid answer to {} (request rejected?)", op))
}
