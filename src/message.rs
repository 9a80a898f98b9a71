//! Rendering of outbound Slack messages

use serde_json::{Value, json};

use crate::DeliveryMode;
use crate::webhook::DeployEvent;

/// Placeholder for fields the deploy event did not carry.
pub const MISSING_FIELD: &str = "<nil>";

const CAT_IMAGE_BASE: &str = "https://cataas.com/cat/jump/says/";

/// A message ready to be posted. Built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Plain text for an incoming webhook.
    Text { text: String },
    /// Section block with an image accessory for chat.postMessage.
    Blocks {
        channel: String,
        text: String,
        image_url: String,
    },
}

impl OutboundMessage {
    /// Human readable text of the message.
    pub fn text(&self) -> &str {
        match self {
            OutboundMessage::Text { text } | OutboundMessage::Blocks { text, .. } => text,
        }
    }

    /// JSON body of the outbound request.
    pub fn payload(&self) -> Value {
        match self {
            OutboundMessage::Text { text } => json!({ "text": text }),
            OutboundMessage::Blocks {
                channel,
                text,
                image_url,
            } => json!({
                "channel": channel,
                "blocks": [
                    {
                        "type": "section",
                        "text": {
                            "type": "mrkdwn",
                            "text": text
                        },
                        "accessory": {
                            "type": "image",
                            "image_url": image_url,
                            "alt_text": "meow"
                        }
                    }
                ]
            }),
        }
    }
}

/// Render the message for `event` in the shape `mode` expects.
/// `destination` is the resolved channel id in API mode and unused otherwise.
pub fn render(mode: DeliveryMode, destination: &str, event: &DeployEvent) -> OutboundMessage {
    match mode {
        DeliveryMode::Webhook => OutboundMessage::Text {
            text: render_text(event),
        },
        DeliveryMode::Api => render_blocks(destination, event),
    }
}

pub fn render_text(event: &DeployEvent) -> String {
    format!(
        "*{}* deployed to *{}*.\n*committer:* {}\n*commit_url:* {}\n*review_url:* {}\n*deploy_url:* {}\n*branch:* {}",
        or_missing(&event.name),
        or_missing(&event.context),
        or_missing(&event.committer),
        or_missing(&event.commit_url),
        or_missing(&event.review_url),
        event.deploy_link().unwrap_or(MISSING_FIELD),
        or_missing(&event.branch),
    )
}

pub fn render_blocks(channel_id: &str, event: &DeployEvent) -> OutboundMessage {
    let committer = or_missing(&event.committer);
    let text = format!(
        "*{}* deployed to *{}* by {} from *branch:* {} [<{}|see commit>] [<{}|validate>]",
        or_missing(&event.name),
        or_missing(&event.context),
        committer,
        or_missing(&event.branch),
        or_missing(&event.commit_url),
        event.deploy_link().unwrap_or(MISSING_FIELD),
    );
    let image_url = format!(
        "{}{}%0Adeployed!?t=or",
        CAT_IMAGE_BASE,
        urlencoding::encode(committer)
    );

    OutboundMessage::Blocks {
        channel: channel_id.to_string(),
        text,
        image_url,
    }
}

fn or_missing(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or(MISSING_FIELD)
}
