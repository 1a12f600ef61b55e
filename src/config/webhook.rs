//! Webhook delivery configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Remote webhook the dispatcher posts messages to
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint URL
    pub url: String,

    /// Static auth key; the header is omitted when empty
    #[serde(default)]
    pub auth_key: String,

    /// Header carrying the auth key
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    /// Upper bound on a single webhook request, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_auth_key(&self) -> bool {
        !self.auth_key.is_empty()
    }

    /// Validate webhook configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("WEBHOOK_URL"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidWebhookUrl);
        }
        if self.auth_header.trim().is_empty() {
            return Err(ValidationError::InvalidAuthHeader);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth_key: String::new(),
            auth_header: default_auth_header(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_auth_header() -> String {
    "x-ins-auth-key".to_string()
}

fn default_timeout() -> u64 {
    10
}
