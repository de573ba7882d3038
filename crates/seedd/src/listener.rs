//! Inbound RPC listener.
//!
//! Accepts TCP connections and spawns one handler per connection. A handler
//! reads one request, answers it, and closes. Protocol errors close the
//! connection without a response.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use seed_core::wire::{self, RequestEnvelope};
use seed_core::{Request, WireError};

use crate::dispatch::RpcDispatcher;

/// Per-connection limits.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub max_request_size: usize,
    pub request_timeout: Duration,
}

pub struct ConnectionListener {
    listener: TcpListener,
    dispatcher: Arc<RpcDispatcher>,
    limits: ConnectionLimits,
    shutdown: broadcast::Receiver<()>,
}

impl ConnectionListener {
    pub fn new(
        listener: TcpListener,
        dispatcher: Arc<RpcDispatcher>,
        limits: ConnectionLimits,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            listener,
            dispatcher,
            limits,
            shutdown,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "rpc listener starting");
        }

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("rpc listener shutting down");
                    return Ok(());
                }

                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(r) => r,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    tracing::debug!(%peer, "new connection");

                    let dispatcher = self.dispatcher.clone();
                    let limits = self.limits;
                    tokio::spawn(handle_connection(stream, peer, dispatcher, limits));
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    dispatcher: Arc<RpcDispatcher>,
    limits: ConnectionLimits,
) {
    let exchange = serve_one(&mut stream, &dispatcher, limits.max_request_size);
    match tokio::time::timeout(limits.request_timeout, exchange).await {
        Ok(Ok(op)) => tracing::debug!(%peer, op, "request served"),
        Ok(Err(WireError::Closed)) => tracing::trace!(%peer, "connection closed without a request"),
        Ok(Err(e)) => tracing::debug!(%peer, error = %e, "dropping connection"),
        Err(_) => tracing::warn!(%peer, timeout = ?limits.request_timeout, "request timed out"),
    }
}

/// Read one request, answer it, and shut the write side down.
async fn serve_one(
    stream: &mut TcpStream,
    dispatcher: &RpcDispatcher,
    max_request_size: usize,
) -> Result<&'static str, WireError> {
    let envelope: RequestEnvelope = wire::read_message(stream, max_request_size).await?;
    let request = Request::try_from(envelope)?;
    let op = request.operation();

    let response = dispatcher.dispatch(request);
    wire::write_message(stream, &response).await?;
    stream.shutdown().await?;
    Ok(op)
}
