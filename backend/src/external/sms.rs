//! Outbound SMS channels
//!
//! A channel never fails its caller: every attempt ends in a `ChannelReceipt`
//! whose status is persisted with the notification record.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use shared::DeliveryStatus;

use crate::config::{SmsConfig, SmsMode};
use crate::error::AppError;

/// Result of one send attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReceipt {
    pub status: DeliveryStatus,
    pub reference: Option<String>,
    pub error: Option<String>,
}

impl ChannelReceipt {
    fn accepted(status: DeliveryStatus, reference: String) -> Self {
        Self {
            status,
            reference: Some(reference),
            error: None,
        }
    }

    pub fn rejected(status: DeliveryStatus, error: AppError) -> Self {
        Self {
            status,
            reference: None,
            error: Some(error.to_string()),
        }
    }
}

/// Delivers a text message to a mobile number
#[async_trait]
pub trait SmsChannel: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> ChannelReceipt;
}

/// Build the channel selected by configuration
pub fn from_config(config: &SmsConfig, timeout: Duration) -> Arc<dyn SmsChannel> {
    match (config.mode, config.gateway_url.as_deref()) {
        (SmsMode::Log, _) => Arc::new(LogOnlyChannel),
        (SmsMode::Gateway, Some(url)) if !url.is_empty() => Arc::new(GatewayChannel::new(
            url.to_string(),
            config.api_token.clone(),
            config.sender_id.clone(),
            timeout,
        )),
        (SmsMode::Gateway, _) => {
            tracing::warn!("SMS gateway mode selected without gateway_url");
            Arc::new(NotConfiguredChannel)
        }
    }
}

// ============================================================================
// Log-only channel
// ============================================================================

/// Records the message in the log instead of sending it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyChannel;

#[async_trait]
impl SmsChannel for LogOnlyChannel {
    async fn send(&self, to: &str, message: &str) -> ChannelReceipt {
        tracing::info!(to = %to, "SMS logged: {}", message);
        ChannelReceipt::accepted(
            DeliveryStatus::Logged,
            format!("local_{}", Utc::now().timestamp_millis()),
        )
    }
}

/// Stand-in when a gateway was requested but cannot be reached
#[derive(Debug, Clone, Copy, Default)]
pub struct NotConfiguredChannel;

#[async_trait]
impl SmsChannel for NotConfiguredChannel {
    async fn send(&self, _to: &str, _message: &str) -> ChannelReceipt {
        ChannelReceipt::rejected(
            DeliveryStatus::NotConfigured,
            AppError::Configuration("SMS gateway not configured".to_string()),
        )
    }
}

// ============================================================================
// HTTP gateway channel
// ============================================================================

/// HTTP SMS gateway client
#[derive(Clone)]
pub struct GatewayChannel {
    http_client: reqwest::Client,
    url: String,
    api_token: Option<String>,
    sender_id: String,
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    to: &'a str,
    message: &'a str,
    sender: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default, alias = "id")]
    message_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GatewayChannel {
    pub fn new(url: String, api_token: Option<String>, sender_id: String, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            url,
            api_token,
            sender_id,
        }
    }
}

#[async_trait]
impl SmsChannel for GatewayChannel {
    async fn send(&self, to: &str, message: &str) -> ChannelReceipt {
        let request = GatewayRequest {
            to,
            message,
            sender: &self.sender_id,
        };

        let mut builder = self.http_client.post(&self.url).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "SMS gateway unreachable");
                return ChannelReceipt::rejected(
                    DeliveryStatus::Failed,
                    AppError::ExternalService(format!("failed to reach SMS gateway: {}", e)),
                );
            }
        };

        let status = response.status();
        let body: GatewayResponse = response.json().await.unwrap_or(GatewayResponse {
            message_id: None,
            error: None,
        });

        if status.is_success() {
            let reference = body
                .message_id
                .unwrap_or_else(|| format!("gateway_{}", Utc::now().timestamp_millis()));
            ChannelReceipt::accepted(DeliveryStatus::Sent, reference)
        } else {
            let error = body
                .error
                .unwrap_or_else(|| format!("SMS gateway returned {}", status));
            tracing::warn!(to = %to, %status, "SMS gateway rejected message");
            ChannelReceipt::rejected(DeliveryStatus::Failed, AppError::ExternalService(error))
        }
    }
}
