//! Webhook delivery - Implementation of MessageDelivery over HTTP.
//!
//! Posts `{"to", "content"}` as JSON to a fixed URL with a static auth key
//! header. Only `202 Accepted` with a `{"message", "messageId"}` body counts
//! as delivered.
//!
//! # Configuration
//!
//! ```ignore
//! let config = WebhookDeliveryConfig::new("https://webhook.site/abc")
//!     .with_auth_key("INS.key")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let delivery = WebhookDelivery::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::WebhookConfig;
use crate::ports::{DeliveryError, DeliveryReceipt, DeliveryRequest, MessageDelivery};

/// Header used when none is configured.
pub const DEFAULT_AUTH_HEADER: &str = "x-ins-auth-key";

/// Configuration for the webhook adapter.
#[derive(Debug)]
pub struct WebhookDeliveryConfig {
    /// Endpoint receiving the POST.
    pub url: String,
    /// Static key sent in the auth header; omitted when `None`.
    auth_key: Option<Secret<String>>,
    /// Name of the auth header.
    pub auth_header: String,
    /// Client-wide timeout; per-call deadlines are usually shorter.
    pub timeout: Duration,
}

impl WebhookDeliveryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_key: None,
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Builds the adapter configuration from the `webhook` config section.
    pub fn from_config(config: &WebhookConfig) -> Self {
        let mut built = Self::new(config.url.clone())
            .with_auth_header(config.auth_header.clone())
            .with_timeout(config.timeout());
        if config.has_auth_key() {
            built = built.with_auth_key(config.auth_key.clone());
        }
        built
    }

    pub fn with_auth_key(mut self, key: impl Into<String>) -> Self {
        self.auth_key = Some(Secret::new(key.into()));
        self
    }

    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = header.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors raised while building the adapter.
#[derive(Debug, Error)]
pub enum WebhookSetupError {
    #[error("invalid auth header name '{0}'")]
    InvalidHeaderName(String),

    #[error("auth key is not a valid header value")]
    InvalidAuthKey,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Provider response to an accepted message.
#[derive(Debug, Deserialize)]
struct WebhookResponse {
    message: String,
    #[serde(rename = "messageId")]
    message_id: String,
}

/// Delivers messages by POSTing them to the configured webhook.
pub struct WebhookDelivery {
    url: String,
    auth: Option<(HeaderName, HeaderValue)>,
    client: Client,
}

impl WebhookDelivery {
    pub fn new(config: WebhookDeliveryConfig) -> Result<Self, WebhookSetupError> {
        let auth = match &config.auth_key {
            Some(key) => {
                let name = HeaderName::from_bytes(config.auth_header.trim().as_bytes())
                    .map_err(|_| WebhookSetupError::InvalidHeaderName(config.auth_header.clone()))?;
                let mut value = HeaderValue::from_str(key.expose_secret())
                    .map_err(|_| WebhookSetupError::InvalidAuthKey)?;
                value.set_sensitive(true);
                Some((name, value))
            }
            None => None,
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WebhookSetupError::Client(e.to_string()))?;

        Ok(Self {
            url: config.url,
            auth,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_send_error(e: reqwest::Error, timeout: Duration) -> DeliveryError {
        if e.is_timeout() {
            DeliveryError::timeout(timeout)
        } else if e.is_connect() {
            DeliveryError::transport(format!("connection failed: {}", e))
        } else {
            DeliveryError::transport(e.to_string())
        }
    }
}

#[async_trait]
impl MessageDelivery for WebhookDelivery {
    async fn deliver(
        &self,
        request: &DeliveryRequest,
        timeout: Duration,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let mut builder = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(request);
        if let Some((name, value)) = &self.auth {
            builder = builder.header(name.clone(), value.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, timeout))?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            tracing::debug!(status = status.as_u16(), "Webhook rejected message");
            return Err(DeliveryError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_send_error(e, timeout))?;

        let parsed: WebhookResponse = serde_json::from_slice(&body)
            .map_err(|e| DeliveryError::decode(format!("invalid response body: {}", e)))?;

        if parsed.message_id.is_empty() {
            return Err(DeliveryError::decode("response carried an empty messageId"));
        }

        Ok(DeliveryReceipt {
            provider_message_id: parsed.message_id,
            status_message: parsed.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn delivery_for(server: &MockServer) -> WebhookDelivery {
        let config = WebhookDeliveryConfig::new(format!("{}/hook", server.uri()))
            .with_auth_key("INS.test-key");
        WebhookDelivery::new(config).unwrap()
    }

    fn request() -> DeliveryRequest {
        DeliveryRequest::new("+905551111111", "Hello")
    }

    #[tokio::test]
    async fn accepted_response_yields_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("x-ins-auth-key", "INS.test-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "to": "+905551111111",
                "content": "Hello"
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "message": "Accepted",
                "messageId": "67f2f8a8-ea58-4ed0-a6f9-ff217df4d849"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = delivery_for(&server)
            .deliver(&request(), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(
            receipt.provider_message_id,
            "67f2f8a8-ea58-4ed0-a6f9-ff217df4d849"
        );
        assert_eq!(receipt.status_message, "Accepted");
    }

    #[tokio::test]
    async fn ok_status_is_not_treated_as_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Accepted",
                "messageId": "abc"
            })))
            .mount(&server)
            .await;

        let err = delivery_for(&server)
            .deliver(&request(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err, DeliveryError::UnexpectedStatus { status: 200 });
    }

    #[tokio::test]
    async fn server_error_is_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = delivery_for(&server)
            .deliver(&request(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err, DeliveryError::UnexpectedStatus { status: 500 });
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = delivery_for(&server)
            .deliver(&request(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn missing_message_id_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(202).set_body_json(serde_json::json!({"message": "ok"})),
            )
            .mount(&server)
            .await;

        let err = delivery_for(&server)
            .deliver(&request(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(serde_json::json!({"message": "ok", "messageId": "abc"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = delivery_for(&server)
            .deliver(&request(), Duration::from_millis(200))
            .await
            .unwrap_err();

        assert_eq!(err, DeliveryError::Timeout { timeout_ms: 200 });
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let config = WebhookDeliveryConfig::new("http://127.0.0.1:9/hook");
        let delivery = WebhookDelivery::new(config).unwrap();

        let err = delivery
            .deliver(&request(), Duration::from_secs(2))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn custom_auth_header_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "message": "Accepted",
                "messageId": "abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = WebhookDeliveryConfig::new(server.uri())
            .with_auth_key("secret")
            .with_auth_header("x-api-key");
        let delivery = WebhookDelivery::new(config).unwrap();

        assert!(delivery
            .deliver(&request(), Duration::from_secs(5))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn no_auth_header_without_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_exists("x-ins-auth-key"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "message": "Accepted",
                "messageId": "abc"
            })))
            .mount(&server)
            .await;

        let delivery = WebhookDelivery::new(WebhookDeliveryConfig::new(server.uri())).unwrap();

        assert!(delivery
            .deliver(&request(), Duration::from_secs(5))
            .await
            .is_ok());
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let config = WebhookDeliveryConfig::new("http://localhost")
            .with_auth_key("k")
            .with_auth_header("bad header");

        assert!(matches!(
            WebhookDelivery::new(config),
            Err(WebhookSetupError::InvalidHeaderName(_))
        ));
    }

    #[test]
    fn from_config_skips_empty_key() {
        let section = WebhookConfig {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        let config = WebhookDeliveryConfig::from_config(&section);

        assert!(config.auth_key.is_none());
        assert_eq!(config.auth_header, "x-ins-auth-key");
    }
}
