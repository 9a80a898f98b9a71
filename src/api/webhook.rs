//! Webhook handler for deploy notifications

use axum::{
    body::Bytes,
    extract::{Query, State as AxumState, rejection::BytesRejection},
    http::StatusCode,
};
use std::collections::HashMap;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::SharedState;
use crate::error::{ErrorKind, RelayError};
use crate::relay::relay_deploy;

/// Handles a deploy notification on any method and relays it to Slack.
///
/// Responds with plain text: 200 when the message was delivered or
/// deliberately suppressed, 400 for a bad request, 500 when Slack did not
/// confirm delivery. A body that cannot be buffered (including one over the
/// body size limit) is a 400 like any other unusable body.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    Query(params): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, String) {
    let relay_id = Uuid::now_v7();
    let span = info_span!("relay", %relay_id);

    async move {
        let result = match body {
            Ok(body) => {
                relay_deploy(&state.config, state.notifier.as_ref(), &params, &body).await
            }
            Err(rejection) => Err(RelayError::UnreadableBody(rejection.body_text())),
        };

        match result {
            Ok(outcome) => {
                let message = outcome.response_message();
                info!("{}", message);
                (StatusCode::OK, message)
            }
            Err(e) => {
                let kind = e.kind();
                match kind {
                    ErrorKind::DeliveryFailed | ErrorKind::Internal => error!("{}", e),
                    _ => warn!("{}", e),
                }
                (
                    kind.status_code(),
                    e.public_message(state.config.expose_error_details),
                )
            }
        }
    }
    .instrument(span)
    .await
}
