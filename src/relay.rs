//! The relay pipeline: decode, route, resolve, render, deliver

use std::collections::HashMap;
use tracing::{info, warn};

use crate::RelayConfig;
use crate::decoder::decode_request;
use crate::error::{RelayError, Result};
use crate::message::render;
use crate::notifier::Notifier;
use crate::routing::{Route, route};

/// Successful end of a relay request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered { channel: String, text: String },
    /// Deliberately not sent; still a success for the caller.
    Suppressed { channel: String },
}

impl RelayOutcome {
    pub fn response_message(&self) -> String {
        match self {
            RelayOutcome::Delivered { text, .. } => {
                format!("Successfully published deploy status: {}", text)
            }
            RelayOutcome::Suppressed { channel } => format!(
                "Did not publish status to {} channel because this was not a production deploy",
                channel
            ),
        }
    }
}

/// Handle one deploy notification. At most one outbound call is made.
pub async fn relay_deploy(
    config: &RelayConfig,
    notifier: &dyn Notifier,
    query: &HashMap<String, String>,
    body: &[u8],
) -> Result<RelayOutcome> {
    let (event, params) = decode_request(query, body, &config.required_params, &config.fields)?;
    info!(
        "Deploy event for '{}' ({}) requested channel '{}' {:?}",
        event.name.as_deref().unwrap_or_default(),
        event.context.as_deref().unwrap_or_default(),
        params.channel,
        params.extra
    );

    let channel = match route(&event, &params, &config.routing) {
        Route::Suppress { channel } => {
            info!("Suppressed non-production deploy for channel '{}'", channel);
            return Ok(RelayOutcome::Suppressed { channel });
        }
        Route::Deliver { channel } => channel,
    };

    let Some(destination) = config.channels.resolve(&channel) else {
        warn!("No channel directory entry for '{}'", channel);
        return Err(RelayError::UnknownChannel(channel));
    };

    let message = render(config.delivery.mode, destination, &event);
    notifier.send(destination, &message).await?;

    Ok(RelayOutcome::Delivered {
        channel,
        text: message.text().to_string(),
    })
}
