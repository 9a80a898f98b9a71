//! API module for all HTTP handlers

pub mod stats;
pub mod webhook;

use axum::{Router, routing};

use crate::SharedState;

/// Build the application router. `/` accepts any method.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", routing::any(webhook::handle_webhook))
        .route("/status", routing::get(stats::status))
        .with_state(state)
}
