//! Message module - Outbound messages awaiting webhook delivery.

mod aggregate;
mod errors;
mod values;

pub use aggregate::Message;
pub use errors::MessageError;
pub use values::{MessageContent, Recipient, MAX_CONTENT_CHARS};
