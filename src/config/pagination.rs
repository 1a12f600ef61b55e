//! Pagination limits for the sent-messages listing

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the caller gives none
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size a caller may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_page_size == 0 {
            return Err(ValidationError::InvalidPagination("default page size must be positive"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ValidationError::InvalidPagination(
                "default page size exceeds maximum",
            ));
        }
        Ok(())
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}
