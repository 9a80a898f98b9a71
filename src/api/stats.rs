//! Status endpoint

use axum::{Json, extract::State as AxumState};
use serde::Serialize;

use crate::SharedState;

/// Server status
#[derive(Debug, Serialize)]
pub struct ServerStatus {
    pub name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub delivery_mode: &'static str,
    pub total_channels: usize,
    pub status_channel: Option<String>,
}

/// GET /status - Report uptime and the loaded relay configuration
pub async fn status(AxumState(state): AxumState<SharedState>) -> Json<ServerStatus> {
    Json(ServerStatus {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        started_at: state.started_at.to_rfc3339(),
        delivery_mode: state.config.delivery.mode.as_str(),
        total_channels: state.config.channels.len(),
        status_channel: state.config.routing.status_channel.clone(),
    })
}
