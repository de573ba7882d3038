//! status and nodes commands — read the daemon's status API.

use anyhow::Result;
use serde::Deserialize;

use seed_core::{NodeAddress, NodeId};

use super::http::{base_url, get_json};

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusResponse {
    node_count: usize,
    cursor: usize,
    uptime_secs: u64,
    listen_port: u16,
    polling_interval_ms: u64,
}

#[derive(Deserialize)]
struct NodesResponse {
    nodes: Vec<NodeInfo>,
}

#[derive(Deserialize)]
struct NodeInfo {
    id: NodeId,
    ip: String,
    port: u16,
    lat: Option<f64>,
    long: Option<f64>,
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Seed Server Status");
    println!("═══════════════════════════════════════");
    println!("  Registered nodes : {}", resp.node_count);
    println!("  Probe cursor     : {}", resp.cursor);
    println!("  RPC port         : {}", resp.listen_port);
    println!("  Poll interval    : {} ms", resp.polling_interval_ms);
    println!("  Uptime           : {}s", resp.uptime_secs);

    Ok(())
}

pub async fn cmd_nodes(port: u16) -> Result<()> {
    let resp: NodesResponse = get_json(&format!("{}/nodes", base_url(port))).await?;

    if resp.nodes.is_empty() {
        println!("No nodes registered.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Registered Nodes ({})", resp.nodes.len());
    println!("═══════════════════════════════════════");

    for n in &resp.nodes {
        for line in node_lines(n) {
            println!("{line}");
        }
    }

    Ok(())
}

fn node_lines(n: &NodeInfo) -> [String; 3] {
    let location = match (n.lat, n.long) {
        (Some(lat), Some(long)) => format!("{:.4}, {:.4}", lat, long),
        _ => "unknown".to_string(),
    };
    [
        format!("  ┌─ {}", n.id),
        format!("  │  addr     : {}", NodeAddress::new(n.ip.as_str(), n.port)),
        format!("  └─ location : {}", location),
    ]
}
