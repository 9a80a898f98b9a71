//! Turns a raw relay request into a deploy event plus routing parameters

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{RelayError, Result};
use crate::webhook::{DeployEvent, FieldAliases};

/// Query-string values that decide where a notification goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingParams {
    pub channel: String,
    pub secondary_channel: Option<String>,
    /// Extra required parameters, in the order they were checked.
    pub extra: Vec<(String, String)>,
}

/// Decode the body first, then `channel`, then each extra required parameter
/// left to right. The first failure wins.
pub fn decode_request(
    query: &HashMap<String, String>,
    body: &[u8],
    required_params: &[String],
    aliases: &FieldAliases,
) -> Result<(DeployEvent, RoutingParams)> {
    let payload: Map<String, Value> =
        serde_json::from_slice(body).map_err(RelayError::InvalidBody)?;
    debug!("Decoded payload with {} keys", payload.len());

    let channel = required_param(query, "channel")?;
    let extra = required_params
        .iter()
        .map(|name| required_param(query, name).map(|value| (name.clone(), value)))
        .collect::<Result<Vec<_>>>()?;

    let secondary_channel = query
        .get("secondary_channel")
        .filter(|v| !v.is_empty())
        .cloned();

    Ok((
        DeployEvent::from_payload(&payload, aliases),
        RoutingParams {
            channel,
            secondary_channel,
            extra,
        },
    ))
}

fn required_param(query: &HashMap<String, String>, key: &str) -> Result<String> {
    match query.get(key) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(RelayError::MissingParameter(key.to_string())),
    }
}
