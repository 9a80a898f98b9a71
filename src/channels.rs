//! Channel directory: channel name to outbound destination

use serde::Deserialize;
use std::collections::HashMap;

/// Read-only mapping from a channel name to where its notifications go.
///
/// In webhook mode the destination is an incoming-webhook URL, in API mode it
/// is a Slack channel id. Lookups are exact and case-sensitive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ChannelDirectory(HashMap<String, String>);

impl ChannelDirectory {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    pub fn resolve(&self, channel: &str) -> Option<&str> {
        self.0.get(channel).map(String::as_str).filter(|d| !d.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ChannelDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
