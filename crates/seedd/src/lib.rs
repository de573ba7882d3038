//! seedd — bootstrap server for the overlay network.
//!
//! Peers register, deregister, and ask for a seed to connect to. One event
//! loop owns the registry; the RPC listener, probe ticker, and probers talk
//! to it only through the event channel.

pub mod dispatch;
pub mod event_loop;
pub mod listener;
pub mod prober;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use seed_core::SeedConfig;
use seed_services::registry::snapshot_channel;
use seed_services::{EventReceiver, EventSender, SnapshotReceiver, SnapshotSender};

use dispatch::RpcDispatcher;
use event_loop::EventLoop;
use listener::{ConnectionLimits, ConnectionListener};
use prober::ProbeTimeouts;

/// A bound but not yet running seed server.
pub struct SeedServer {
    config: SeedConfig,
    listener: TcpListener,
    events_tx: EventSender,
    events_rx: EventReceiver,
    snapshot_tx: SnapshotSender,
    snapshot_rx: SnapshotReceiver,
}

impl SeedServer {
    /// Bind the RPC listener. Nothing runs until [`SeedServer::run`].
    pub async fn bind(config: SeedConfig) -> Result<Self> {
        let bind_addr = (config.network.bind_addr.as_str(), config.network.port);
        let listener = TcpListener::bind(bind_addr).await.with_context(|| {
            format!(
                "failed to bind rpc listener on {}:{}",
                config.network.bind_addr, config.network.port
            )
        })?;

        let (events_tx, events_rx) = seed_services::event::channel();
        let (snapshot_tx, snapshot_rx) = snapshot_channel();

        Ok(Self {
            config,
            listener,
            events_tx,
            events_rx,
            snapshot_tx,
            snapshot_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("rpc listener has no local address")
    }

    /// Sender into the event loop.
    pub fn events(&self) -> EventSender {
        self.events_tx.clone()
    }

    /// Receiver of registry snapshots published by the event loop.
    pub fn snapshots(&self) -> SnapshotReceiver {
        self.snapshot_rx.clone()
    }

    /// Run until `shutdown` fires or a core task exits.
    pub async fn run(self, shutdown: broadcast::Sender<()>) -> Result<()> {
        let Self {
            config,
            listener,
            events_tx,
            events_rx,
            snapshot_tx,
            snapshot_rx,
        } = self;

        let listen_port = listener.local_addr()?.port();
        let mut shutdown_rx = shutdown.subscribe();

        let event_loop_task = tokio::spawn(
            EventLoop::new(
                events_rx,
                events_tx.clone(),
                snapshot_tx,
                ProbeTimeouts::from_config(&config.probe),
                shutdown.subscribe(),
            )
            .run(),
        );

        let ticker_task = tokio::spawn(event_loop::probe_ticker(
            events_tx.clone(),
            config.probe.polling_interval(),
            shutdown.subscribe(),
        ));

        let dispatcher = Arc::new(RpcDispatcher::new(events_tx, snapshot_rx.clone()));
        let listener_task = tokio::spawn(
            ConnectionListener::new(
                listener,
                dispatcher,
                ConnectionLimits {
                    max_request_size: config.network.max_request_size,
                    request_timeout: config.network.request_timeout(),
                },
                shutdown.subscribe(),
            )
            .run(),
        );

        // Status API
        let api_port = config.network.api_port;
        if api_port != 0 {
            let state = seed_api::ApiState {
                snapshots: snapshot_rx,
                started_at: Instant::now(),
                listen_port,
                polling_interval_ms: config.probe.polling_interval_ms,
            };
            let api_shutdown = shutdown.subscribe();
            tokio::spawn(async move {
                if let Err(e) = seed_api::serve(state, api_port, api_shutdown).await {
                    tracing::error!(error = %e, "status server failed");
                }
            });
        } else {
            tracing::info!("status API disabled");
        }

        tracing::info!(
            port = listen_port,
            polling_interval_ms = config.probe.polling_interval_ms,
            "seed server running"
        );

        tokio::select! {
            _ = shutdown_rx.recv()  => tracing::info!("shutting down"),
            r = event_loop_task     => tracing::error!("event loop exited: {:?}", r),
            r = listener_task       => tracing::error!("rpc listener exited: {:?}", r),
            r = ticker_task         => tracing::error!("probe ticker exited: {:?}", r),
        }

        Ok(())
    }
}
