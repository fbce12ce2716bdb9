//! Messaging transport interface.

use crate::types::ContactId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("rejected by server: {0}")]
    Rejected(String),
}

/// Sends text and photos to a recipient.
///
/// Errors are reported to the caller, which logs them; implementations must not
/// retry on their own.
pub trait Transport {
    fn send_message(&mut self, recipient: &ContactId, text: &str) -> Result<(), TransportError>;
    fn send_photo(&mut self, recipient: &ContactId, png: &[u8]) -> Result<(), TransportError>;
}
