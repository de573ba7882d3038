//! /nodes and /nodes/{id} handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use seed_core::{Node, NodeId};

use super::ApiState;

#[derive(Debug, Serialize)]
pub struct NodesResponse {
    pub nodes: Vec<NodeInfo>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub ip: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
}

impl From<&Node> for NodeInfo {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            ip: node.address.ip.clone(),
            port: node.address.port,
            lat: node.location.map(|l| l.lat),
            long: node.location.map(|l| l.long),
        }
    }
}

/// Registry contents in registry order.
pub async fn handle_nodes(State(state): State<ApiState>) -> Json<NodesResponse> {
    let snapshot = state.snapshots.borrow().clone();
    Json(NodesResponse {
        nodes: snapshot.nodes.iter().map(NodeInfo::from).collect(),
    })
}

pub async fn handle_node(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<NodeInfo>, (StatusCode, String)> {
    let snapshot = state.snapshots.borrow().clone();
    // Path segments are text, so a numeric id matches its decimal form.
    snapshot
        .nodes
        .iter()
        .find(|n| n.id.to_string() == id)
        .map(|n| Json(NodeInfo::from(n)))
        .ok_or((StatusCode::NOT_FOUND, format!("node {id} not registered")))
}
