//! Outbound delivery to Slack
//!
//! Every send is a single attempt bounded by the client timeout. Nothing is
//! retried.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::DeliveryConfig;
use crate::error::DeliveryError;
use crate::message::OutboundMessage;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`. `destination` is the channel directory entry the
    /// message was rendered for.
    async fn send(&self, destination: &str, message: &OutboundMessage)
    -> Result<(), DeliveryError>;
}

/// Where the bearer token for chat.postMessage comes from.
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Read from this environment variable on every call. Unset means empty.
    Env(String),
    Static(String),
}

impl TokenSource {
    pub fn token(&self) -> String {
        match self {
            TokenSource::Env(var) => std::env::var(var).unwrap_or_default(),
            TokenSource::Static(token) => token.clone(),
        }
    }
}

pub struct SlackNotifier {
    client: Client,
    api_url: String,
    token: TokenSource,
}

impl SlackNotifier {
    pub fn new(config: &DeliveryConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: TokenSource::Env(config.token_env.clone()),
        })
    }

    pub fn with_token(mut self, token: TokenSource) -> Self {
        self.token = token;
        self
    }

    /// Incoming webhooks answer with the literal body `ok`.
    ///
    /// The webhook URL is a credential, so it is stripped from transport errors.
    async fn post_webhook(&self, url: &str, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .json(&message.payload())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        debug!("Webhook responded {} with {:?}", status, body);

        if body != "ok" {
            return Err(DeliveryError::Rejected(format!("{} {}", status, body)));
        }
        Ok(())
    }

    /// chat.postMessage answers with a JSON object whose `ok` must be `true`.
    async fn post_api(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.token.token())
            .json(&message.payload())
            .send()
            .await?;
        let body = response.text().await?;
        let raw: Value = serde_json::from_str(&body).map_err(DeliveryError::MalformedResponse)?;
        debug!("chat.postMessage responded with {}", raw);

        if raw.get("ok") != Some(&Value::Bool(true)) {
            let reason = raw
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("ok was not true");
            return Err(DeliveryError::Rejected(reason.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(
        &self,
        destination: &str,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        match message {
            OutboundMessage::Text { .. } => {
                info!("Posting to incoming webhook");
                self.post_webhook(destination, message).await
            }
            OutboundMessage::Blocks { channel, .. } => {
                info!("Posting to {} for channel {}", self.api_url, channel);
                self.post_api(message).await
            }
        }
    }
}
