//! /status handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub node_count: usize,
    pub cursor: usize,
    pub uptime_secs: u64,
    pub listen_port: u16,
    pub polling_interval_ms: u64,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let snapshot = state.snapshots.borrow().clone();
    Json(StatusResponse {
        node_count: snapshot.nodes.len(),
        cursor: snapshot.cursor,
        uptime_secs: state.started_at.elapsed().as_secs(),
        listen_port: state.listen_port,
        polling_interval_ms: state.polling_interval_ms,
    })
}
