use std::io;

use axum::http::StatusCode;

/// Error type for deploy_relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Unable to parse body, error: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Unable to read body, error: {0}")]
    UnreadableBody(String),

    #[error("Missing query string parameter for {0}")]
    MissingParameter(String),

    #[error("No destination found for channel: {0}")]
    UnknownChannel(String),

    #[error("Failed to send slack notification due to error: {0}")]
    DeliveryFailed(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

/// Why a single outbound delivery attempt did not succeed
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request to slack failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Non-ok response returned from Slack: {0}")]
    Rejected(String),

    #[error("Unable to parse result from slack, error: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

/// Classification of request errors, used to pick the HTTP status and the
/// message the caller gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidBody,
    MissingParameter,
    UnknownChannel,
    DeliveryFailed,
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::InvalidBody | ErrorKind::MissingParameter | ErrorKind::UnknownChannel => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::DeliveryFailed | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::InvalidBody(_) | RelayError::UnreadableBody(_) => ErrorKind::InvalidBody,
            RelayError::MissingParameter(_) => ErrorKind::MissingParameter,
            RelayError::UnknownChannel(_) => ErrorKind::UnknownChannel,
            RelayError::DeliveryFailed(_) => ErrorKind::DeliveryFailed,
            RelayError::ConfigError(_) | RelayError::IoError(_) | RelayError::TomlParseError(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Message returned to the webhook caller.
    ///
    /// Parameter and channel names come from the caller's own request and are
    /// always echoed. Parser and transport detail is only appended when
    /// `expose_details` is set.
    pub fn public_message(&self, expose_details: bool) -> String {
        let status = self.kind().status_code().as_u16();
        let summary = match self {
            RelayError::InvalidBody(_) => "Unable to parse body".to_string(),
            RelayError::UnreadableBody(_) => "Unable to read body".to_string(),
            RelayError::MissingParameter(name) => {
                format!("Missing query string parameter for {}", name)
            }
            RelayError::UnknownChannel(channel) => format!(
                "No destination found for channel: {}. You must add an entry to the channels table.",
                channel
            ),
            RelayError::DeliveryFailed(_) => "Failed to send slack notification".to_string(),
            _ => "Internal server error".to_string(),
        };

        match self {
            RelayError::InvalidBody(e) if expose_details => {
                format!("{} - {}, error: {}", status, summary, e)
            }
            RelayError::UnreadableBody(e) if expose_details => {
                format!("{} - {}, error: {}", status, summary, e)
            }
            RelayError::DeliveryFailed(e) if expose_details => {
                format!("{} - {} due to error: {}", status, summary, e)
            }
            _ => format!("{} - {}", status, summary),
        }
    }
}

/// Helper type for Results that use RelayError
pub type Result<T> = std::result::Result<T, RelayError>;
