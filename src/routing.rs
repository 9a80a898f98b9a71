//! Suppression and channel override rules

use crate::RoutingConfig;
use crate::decoder::RoutingParams;
use crate::webhook::DeployEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Non-production platform deploy aimed at the status channel; nothing is sent.
    Suppress { channel: String },
    Deliver { channel: String },
}

/// Decide where (and whether) a deploy event is published.
///
/// 1. Platform deploys to the status channel that are not production are suppressed.
/// 2. Otherwise platform deploys go to `secondary_channel` when one is given.
/// 3. Everything else goes to the requested channel.
pub fn route(event: &DeployEvent, params: &RoutingParams, rules: &RoutingConfig) -> Route {
    if event.is_from_platform()
        && rules.is_status_channel(&params.channel)
        && !rules.is_production_deploy(event.context.as_deref(), event.branch.as_deref())
    {
        return Route::Suppress {
            channel: params.channel.clone(),
        };
    }

    match &params.secondary_channel {
        Some(secondary) if event.is_from_platform() => Route::Deliver {
            channel: secondary.clone(),
        },
        _ => Route::Deliver {
            channel: params.channel.clone(),
        },
    }
}
