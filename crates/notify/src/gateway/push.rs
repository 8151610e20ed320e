//! Push notification delivery via FCM.
//!
//! [`FcmGateway`] sends one multicast request per batch of device tokens.
//! Configuration is loaded from environment variables; if
//! `FCM_SERVER_KEY` is not set, [`PushConfig::from_env`] returns `None`
//! and the push channel is skipped for the lifetime of the process.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use placedrive_core::message::PushMessage;

/// Hard upper bound on tokens per multicast request, imposed by the
/// provider. Callers must chunk larger audiences.
pub const PUSH_BATCH_LIMIT: usize = 500;

/// Default FCM endpoint when `FCM_API_URL` is not set.
const DEFAULT_API_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// HTTP request timeout for a single multicast attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Push provider returned HTTP {0}")]
    HttpStatus(u16),

    /// The provider accepted the request but the response body was
    /// unusable.
    #[error("Push provider response error: {0}")]
    Response(String),

    /// The caller handed over more tokens than one request may carry.
    #[error("Push batch of {0} tokens exceeds the {PUSH_BATCH_LIMIT}-token limit")]
    BatchTooLarge(usize),

    /// The call did not complete within the coordinator's deadline.
    #[error("Push call timed out after {0:?}")]
    Timeout(Duration),
}

impl PushError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PushError::Transport(e) => e.is_timeout() || e.is_connect(),
            PushError::HttpStatus(status) => *status == 429 || *status >= 500,
            PushError::Timeout(_) => true,
            PushError::Response(_) | PushError::BatchTooLarge(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// PushGateway
// ---------------------------------------------------------------------------

/// Per-batch delivery counts reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReceipt {
    pub delivered: usize,
    pub failed: usize,
}

/// Outbound push channel.
///
/// One call delivers the same message to up to [`PUSH_BATCH_LIMIT`]
/// device tokens.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send_multicast(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<BatchReceipt, PushError>;
}

// ---------------------------------------------------------------------------
// PushConfig
// ---------------------------------------------------------------------------

/// Configuration for the FCM push gateway.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Server key presented in the `Authorization` header.
    pub server_key: String,
    /// Multicast endpoint URL.
    pub api_url: String,
}

impl PushConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `FCM_SERVER_KEY` is not set, signalling that
    /// push delivery is not configured and should be skipped.
    ///
    /// | Variable         | Required | Default                                 |
    /// |------------------|----------|-----------------------------------------|
    /// | `FCM_SERVER_KEY` | yes      | —                                       |
    /// | `FCM_API_URL`    | no       | `https://fcm.googleapis.com/fcm/send`   |
    pub fn from_env() -> Option<Self> {
        let server_key = std::env::var("FCM_SERVER_KEY").ok()?;
        Some(Self {
            server_key,
            api_url: std::env::var("FCM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// FcmGateway
// ---------------------------------------------------------------------------

/// Summary counts in the provider's multicast response body.
#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    success: usize,
    #[serde(default)]
    failure: usize,
}

/// Delivers push notifications through FCM's multicast endpoint.
pub struct FcmGateway {
    config: PushConfig,
    client: reqwest::Client,
}

impl FcmGateway {
    /// Create a new gateway with a pre-configured HTTP client.
    pub fn new(config: PushConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl PushGateway for FcmGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<BatchReceipt, PushError> {
        if tokens.is_empty() {
            return Ok(BatchReceipt::default());
        }
        if tokens.len() > PUSH_BATCH_LIMIT {
            return Err(PushError::BatchTooLarge(tokens.len()));
        }

        let payload = serde_json::json!({
            "registration_ids": tokens,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": message.data,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("key={}", self.config.server_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PushError::HttpStatus(response.status().as_u16()));
        }

        let body: FcmResponse = response
            .json()
            .await
            .map_err(|e| PushError::Response(e.to_string()))?;

        Ok(BatchReceipt {
            delivered: body.success,
            failed: body.failure,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
