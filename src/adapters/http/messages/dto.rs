//! Request and response DTOs for the dispatcher endpoints.

use serde::{Deserialize, Serialize};

/// Query string of `GET /sent`.
///
/// Values are kept as raw strings so that malformed numbers fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentMessagesParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl SentMessagesParams {
    pub fn page(&self) -> Option<i64> {
        parse_number(self.page.as_deref())
    }

    pub fn page_size(&self) -> Option<i64> {
        parse_number(self.page_size.as_deref())
    }
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// Body of `POST /start` and `POST /stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessageResponse {
    pub status: String,
}

impl StatusMessageResponse {
    pub const STARTED: &'static str = "Message sender started";
    pub const ALREADY_RUNNING: &'static str = "Message sender is already running";
    pub const STOPPED: &'static str = "Message sender stopped";
    pub const NOT_RUNNING: &'static str = "Message sender is not running";

    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningResponse {
    pub running: bool,
}

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_parse_numbers() {
        let params = SentMessagesParams {
            page: Some("2".to_string()),
            page_size: Some(" 25 ".to_string()),
        };
        assert_eq!(params.page(), Some(2));
        assert_eq!(params.page_size(), Some(25));
    }

    #[test]
    fn malformed_params_are_ignored() {
        let params = SentMessagesParams {
            page: Some("two".to_string()),
            page_size: None,
        };
        assert_eq!(params.page(), None);
        assert_eq!(params.page_size(), None);
    }

    #[test]
    fn error_response_internal_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse::internal("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"code": "INTERNAL_ERROR", "message": "boom"}));
    }
}
