//! Inbound deploy webhook structures

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Fields extracted from a deploy notification body.
///
/// Every field is optional. JSON `null` is treated the same as a missing key,
/// non-string values are kept as their JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployEvent {
    pub site_id: Option<String>,
    pub name: Option<String>,
    pub context: Option<String>,
    pub branch: Option<String>,
    pub committer: Option<String>,
    pub commit_url: Option<String>,
    pub commit_ref: Option<String>,
    pub review_url: Option<String>,
    pub deploy_url: Option<String>,
    pub ssl_url: Option<String>,
}

impl DeployEvent {
    pub fn from_payload(payload: &Map<String, Value>, aliases: &FieldAliases) -> Self {
        let field = |name: &str| field_value(payload, aliases.key_for(name));
        Self {
            site_id: field("site_id"),
            name: field("name"),
            context: field("context"),
            branch: field("branch"),
            committer: field("committer"),
            commit_url: field("commit_url"),
            commit_ref: field("commit_ref"),
            review_url: field("review_url"),
            deploy_url: field("deploy_url"),
            ssl_url: field("ssl_url"),
        }
    }

    /// Events carrying a site id come from the hosting platform rather than CI.
    pub fn is_from_platform(&self) -> bool {
        self.site_id.is_some()
    }

    /// Deployed URL, preferring `deploy_url` over `ssl_url`.
    pub fn deploy_link(&self) -> Option<&str> {
        self.deploy_url.as_deref().or(self.ssl_url.as_deref())
    }
}

fn field_value(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Maps a canonical field name to the key it is sent under, for senders that
/// don't use the hosting platform's names (e.g. TeamCity build parameters).
/// Keys are matched literally, dots included.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FieldAliases(HashMap<String, String>);

impl FieldAliases {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        Self(aliases)
    }

    pub fn key_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.0.get(field).map(String::as_str).unwrap_or(field)
    }
}
