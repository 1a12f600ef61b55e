//! Value objects for outbound messages.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Maximum message content length, counted in Unicode scalar values.
pub const MAX_CONTENT_CHARS: usize = 150;

/// Destination address (typically a phone number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipient(String);

impl Recipient {
    /// Creates a recipient, rejecting blank addresses.
    pub fn new(address: impl Into<String>) -> Result<Self, ValidationError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(ValidationError::empty_field("to"));
        }
        Ok(Self(address))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message body, bounded to [`MAX_CONTENT_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    /// Creates message content, rejecting text longer than the limit.
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        let length = text.chars().count();
        if length > MAX_CONTENT_CHARS {
            return Err(ValidationError::too_long("content", MAX_CONTENT_CHARS, length));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn recipient_rejects_blank() {
        assert_eq!(
            Recipient::new("   ").unwrap_err(),
            ValidationError::empty_field("to")
        );
    }

    #[test]
    fn recipient_keeps_address() {
        let to = Recipient::new("+905551111111").unwrap();
        assert_eq!(to.as_str(), "+905551111111");
    }

    #[test]
    fn content_at_limit_is_accepted() {
        let text = "a".repeat(MAX_CONTENT_CHARS);
        let content = MessageContent::new(text).unwrap();
        assert_eq!(content.char_count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn content_over_limit_is_rejected() {
        let text = "a".repeat(MAX_CONTENT_CHARS + 1);
        let err = MessageContent::new(text).unwrap_err();
        assert_eq!(err, ValidationError::too_long("content", 150, 151));
    }

    #[test]
    fn content_limit_counts_characters_not_bytes() {
        // 150 two-byte characters: 300 bytes, still within the limit.
        let text = "ş".repeat(MAX_CONTENT_CHARS);
        assert!(MessageContent::new(text).is_ok());
    }

    proptest! {
        #[test]
        fn content_accepted_iff_within_limit(text in "\\PC{0,200}") {
            let accepted = MessageContent::new(text.clone()).is_ok();
            prop_assert_eq!(accepted, text.chars().count() <= MAX_CONTENT_CHARS);
        }
    }
}
