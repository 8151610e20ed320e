//! Templated messaging delivery via the WhatsApp Cloud API.
//!
//! [`WhatsAppGateway`] sends one pre-approved template message per
//! recipient. Configuration is loaded from environment variables; if
//! either `WHATSAPP_PHONE_NUMBER_ID` or `WHATSAPP_ACCESS_TOKEN` is not
//! set, [`MessagingConfig::from_env`] returns `None` and the messaging
//! channel is skipped for the lifetime of the process.

use std::time::Duration;

use async_trait::async_trait;

use placedrive_core::message::TemplateMessage;

/// Default Graph API base when `WHATSAPP_API_URL` is not set.
const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v17.0";

/// HTTP request timeout for a single send attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for messaging delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Messaging provider returned HTTP {0}")]
    HttpStatus(u16),

    /// The recipient identifier is not a dialable number.
    #[error("Invalid messaging recipient: {0}")]
    InvalidRecipient(String),

    /// The call did not complete within the coordinator's deadline.
    #[error("Messaging call timed out after {0:?}")]
    Timeout(Duration),
}

impl MessagingError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MessagingError::Transport(e) => e.is_timeout() || e.is_connect(),
            MessagingError::HttpStatus(status) => *status == 429 || *status >= 500,
            MessagingError::Timeout(_) => true,
            MessagingError::InvalidRecipient(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// MessagingGateway
// ---------------------------------------------------------------------------

/// Outbound templated messaging channel. One call reaches one recipient.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_template(
        &self,
        recipient: &str,
        message: &TemplateMessage,
    ) -> Result<(), MessagingError>;
}

// ---------------------------------------------------------------------------
// MessagingConfig
// ---------------------------------------------------------------------------

/// Configuration for the WhatsApp Cloud API gateway.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// Business phone number id that owns the template.
    pub phone_number_id: String,
    /// Bearer token for the Graph API.
    pub access_token: String,
    /// Graph API base URL (no trailing slash).
    pub api_base: String,
}

impl MessagingConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless both `WHATSAPP_PHONE_NUMBER_ID` and
    /// `WHATSAPP_ACCESS_TOKEN` are set, signalling that messaging
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable                  | Required | Default                            |
    /// |---------------------------|----------|------------------------------------|
    /// | `WHATSAPP_PHONE_NUMBER_ID`| yes      | —                                  |
    /// | `WHATSAPP_ACCESS_TOKEN`   | yes      | —                                  |
    /// | `WHATSAPP_API_URL`        | no       | `https://graph.facebook.com/v17.0` |
    pub fn from_env() -> Option<Self> {
        let phone_number_id = std::env::var("WHATSAPP_PHONE_NUMBER_ID").ok()?;
        let access_token = std::env::var("WHATSAPP_ACCESS_TOKEN").ok()?;
        Some(Self {
            phone_number_id,
            access_token,
            api_base: std::env::var("WHATSAPP_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        })
    }

    /// Full URL of the messages endpoint for this phone number.
    pub fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.phone_number_id)
    }
}

// ---------------------------------------------------------------------------
// WhatsAppGateway
// ---------------------------------------------------------------------------

/// Delivers template messages through the WhatsApp Cloud API.
pub struct WhatsAppGateway {
    config: MessagingConfig,
    client: reqwest::Client,
}

impl WhatsAppGateway {
    /// Create a new gateway with a pre-configured HTTP client.
    pub fn new(config: MessagingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl MessagingGateway for WhatsAppGateway {
    async fn send_template(
        &self,
        recipient: &str,
        message: &TemplateMessage,
    ) -> Result<(), MessagingError> {
        // Recipients arrive pre-normalized; anything non-numeric here is
        // a bug upstream, not something to put on the wire.
        if recipient.is_empty() || !recipient.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MessagingError::InvalidRecipient(recipient.to_string()));
        }

        let parameters: Vec<serde_json::Value> = message
            .body_params
            .iter()
            .map(|text| serde_json::json!({ "type": "text", "text": text }))
            .collect();

        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": recipient,
            "type": "template",
            "template": {
                "name": message.template_name,
                "language": { "code": message.language_code },
                "components": [
                    {
                        "type": "body",
                        "parameters": parameters,
                    }
                ],
            },
        });

        let response = self
            .client
            .post(self.config.messages_url())
            .bearer_auth(&self.config.access_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MessagingError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
