//! Seed server integration test harness.
//!
//! Each test starts its own `SeedServer` in-process on an OS-assigned port
//! with the status API disabled and a probe interval long enough that the
//! ticker never fires on its own. Probing is driven by injecting
//! `ProbeTick` events directly.
//!
//!   cargo test --test integration

mod membership;
mod protocol;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use seed_core::wire::{self, RequestEnvelope};
use seed_core::{Response, SeedConfig};
use seed_services::{Event, EventSender, RegistrySnapshot, SnapshotReceiver};
use seedd::SeedServer;

// ── Harness ───────────────────────────────────────────────────────────────────

/// How long any single wait in these tests may take.
pub const WAIT: Duration = Duration::from_secs(5);

/// A seed server running inside the test's runtime.
pub struct TestServer {
    pub addr: SocketAddr,
    pub events: EventSender,
    pub snapshots: SnapshotReceiver,
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let mut config = SeedConfig::default();
        config.network.bind_addr = "127.0.0.1".to_string();
        config.network.port = 0;
        config.network.api_port = 0;
        config.probe.polling_interval_ms = 3_600_000;
        config.probe.connect_timeout_ms = 500;
        config.probe.response_timeout_ms = 500;

        let server = SeedServer::bind(config).await?;
        let addr = server.local_addr()?;
        let events = server.events();
        let snapshots = server.snapshots();

        let (shutdown, _) = broadcast::channel(1);
        let task = tokio::spawn(server.run(shutdown.clone()));

        Ok(Self {
            addr,
            events,
            snapshots,
            shutdown,
            task,
        })
    }

    /// Send one raw JSON request and return the raw JSON answer, if any.
    pub async fn send(&self, request: Value) -> Result<Option<Value>> {
        let bytes = serde_json::to_vec(&request)?;
        self.send_bytes(&bytes).await
    }

    /// Send one request and decode the answer as a `Response`.
    pub async fn call(&self, request: Value) -> Result<Response> {
        let raw = self
            .send(request)
            .await?
            .context("server closed the connection without answering")?;
        Ok(serde_json::from_value(raw)?)
    }

    pub async fn send_bytes(&self, bytes: &[u8]) -> Result<Option<Value>> {
        let exchange = async {
            let mut stream = TcpStream::connect(self.addr).await?;
            stream.write_all(bytes).await?;

            let mut reply = Vec::new();
            match stream.read_to_end(&mut reply).await {
                Ok(_) => {}
                // Dropping a connection with unread input resets it.
                Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => {}
                Err(e) => return Err(e.into()),
            }

            if reply.is_empty() {
                return Ok(None);
            }
            Ok(Some(serde_json::from_slice(&reply)?))
        };

        tokio::time::timeout(WAIT, exchange)
            .await
            .context("request timed out")?
    }

    pub async fn add_node(&self, id: &str, ip: &str, port: u16, location: Option<(f64, f64)>) -> Result<()> {
        let resp = self.call(request("add_node", node_body(id, ip, port, location))).await?;
        if resp.status() != seed_core::Status::Ok {
            bail!("add_node {id} answered {:?}", resp.status());
        }
        Ok(())
    }

    pub async fn dead_node(&self, id: &str, ip: &str, port: u16) -> Result<()> {
        let resp = self.call(request("dead_node", node_body(id, ip, port, None))).await?;
        if resp.status() != seed_core::Status::Ok {
            bail!("dead_node {id} answered {:?}", resp.status());
        }
        Ok(())
    }

    pub async fn get_seed(&self, id: &str, ip: &str, port: u16, location: Option<(f64, f64)>) -> Result<Response> {
        self.call(request("get_seed", node_body(id, ip, port, location))).await
    }

    /// Inject one probe tick, as the ticker would.
    pub fn tick(&self) -> Result<()> {
        self.events
            .send(Event::ProbeTick)
            .map_err(|_| anyhow::anyhow!("event loop is gone"))
    }

    /// Wait until the published registry satisfies `pred`.
    pub async fn wait_for(&self, what: &str, pred: impl FnMut(&RegistrySnapshot) -> bool) -> Result<RegistrySnapshot> {
        let mut pred = pred;
        let mut rx = self.snapshots.clone();
        let waited = tokio::time::timeout(WAIT, async move {
            rx.wait_for(|s| pred(&**s)).await.map(|s| (**s).clone())
        })
        .await;

        match waited {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(_)) => bail!("snapshot channel closed while waiting for {what}"),
            Err(_) => bail!(
                "timed out waiting for {what}; registry is {:?}",
                self.snapshots.borrow().nodes
            ),
        }
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        (**self.snapshots.borrow()).clone()
    }

    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        tokio::time::timeout(WAIT, self.task)
            .await
            .context("server did not stop")??
    }
}

pub fn request(op: &str, body: Value) -> Value {
    json!({ "header": { "type": op }, "body": body })
}

pub fn node_body(id: &str, ip: &str, port: u16, location: Option<(f64, f64)>) -> Value {
    let mut body = json!({ "id": id, "ip": ip, "port": port });
    if let Some((lat, long)) = location {
        body["lat"] = json!(lat);
        body["long"] = json!(long);
    }
    body
}

/// A peer that answers every `poll` with 200.
pub async fn spawn_live_peer() -> Result<(u16, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let request: Result<RequestEnvelope, _> = wire::read_message(&mut stream, 4096).await;
                if request.is_ok() {
                    let _ = wire::write_message(&mut stream, &Response::ok()).await;
                }
            });
        }
    });

    Ok((port, handle))
}

/// A local port with nothing listening on it.
pub async fn dead_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?.port())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_starts_and_stops() -> Result<()> {
    let server = TestServer::start().await?;
    assert_ne!(server.addr.port(), 0, "port 0 should resolve to a real port");
    assert!(server.snapshot().nodes.is_empty());
    server.stop().await
}

#[tokio::test]
async fn test_poll_answers_ok() -> Result<()> {
    let server = TestServer::start().await?;
    let raw = server
        .send(json!({ "header": { "type": "poll" } }))
        .await?
        .expect("poll should be answered");
    assert_eq!(raw["header"]["status"], 200);
    server.stop().await
}
