pub mod api;
pub mod channels;
pub mod decoder;
pub mod error;
pub mod logging;
pub mod message;
pub mod notifier;
pub mod relay;
pub mod routing;
pub mod webhook;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::channels::ChannelDirectory;
use crate::error::{RelayError, Result};
use crate::notifier::Notifier;
use crate::webhook::FieldAliases;

pub const DEFAULT_API_URL: &str = "https://slack.com/api/chat.postMessage";
pub const DEFAULT_TOKEN_ENV: &str = "SLACK_TOKEN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Query parameters that must be present in addition to `channel`,
    /// checked left to right.
    #[serde(default)]
    pub required_params: Vec<String>,
    /// Append parser/transport detail to error responses.
    #[serde(default)]
    pub expose_error_details: bool,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    pub channels: ChannelDirectory,
    #[serde(default)]
    pub fields: FieldAliases,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    /// Channel that only receives production deploys. No suppression when unset.
    pub status_channel: Option<String>,
    #[serde(default = "default_production_context")]
    pub production_context: String,
    #[serde(default = "default_production_branch")]
    pub production_branch: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            status_channel: None,
            production_context: default_production_context(),
            production_branch: default_production_branch(),
        }
    }
}

impl RoutingConfig {
    /// A deploy counts as production when it was built in the production
    /// context or from the production branch.
    pub fn is_production_deploy(&self, context: Option<&str>, branch: Option<&str>) -> bool {
        context == Some(self.production_context.as_str())
            || branch == Some(self.production_branch.as_str())
    }

    pub fn is_status_channel(&self, channel: &str) -> bool {
        self.status_channel.as_deref() == Some(channel)
    }
}

fn default_production_context() -> String {
    "production".to_string()
}

fn default_production_branch() -> String {
    "master".to_string()
}

/// Shape of the outbound call.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// `{"text": ...}` to a per-channel incoming webhook URL.
    #[default]
    Webhook,
    /// Block payload to chat.postMessage with a bearer token.
    Api,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Webhook => "webhook",
            DeliveryMode::Api => "api",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub mode: DeliveryMode,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::default(),
            timeout_secs: default_timeout_secs(),
            api_url: default_api_url(),
            token_env: default_token_env(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

impl RelayConfig {
    /// Parse and validate a TOML configuration document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RelayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(RelayError::ConfigError(
                "at least one entry is required in [channels]".to_string(),
            ));
        }
        if self.delivery.timeout_secs == 0 {
            return Err(RelayError::ConfigError(
                "delivery.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.delivery.mode == DeliveryMode::Webhook {
            if let Some((name, url)) = self
                .channels
                .iter()
                .find(|(_, url)| !(url.starts_with("http://") || url.starts_with("https://")))
            {
                return Err(RelayError::ConfigError(format!(
                    "channel '{}' must map to a webhook URL in webhook mode, got '{}'",
                    name, url
                )));
            }
        }
        if self
            .required_params
            .iter()
            .any(|p| p.is_empty() || p == "channel")
        {
            return Err(RelayError::ConfigError(
                "required_params must not contain empty names or 'channel'".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and parse the configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<RelayConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        RelayError::ConfigError(format!("Failed to read config file '{}': {}", path.display(), e))
    })?;

    RelayConfig::from_toml(&content).map_err(|e| match e {
        RelayError::TomlParseError(e) => RelayError::ConfigError(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        )),
        other => other,
    })
}

pub struct AppState {
    pub config: RelayConfig,
    pub notifier: Arc<dyn Notifier>,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: RelayConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            notifier,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;
