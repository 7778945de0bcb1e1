//! Outgoing message and delivery types.

use serde::{Deserialize, Serialize};

/// A message to publish to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Plain-text message body
    pub body: String,
    /// Target group on the messaging service
    pub group_id: u64,
}

impl OutgoingMessage {
    #[must_use]
    pub fn new(body: impl Into<String>, group_id: u64) -> Self {
        Self {
            body: body.into(),
            group_id,
        }
    }
}

/// Response of the messaging service to a post.
///
/// A non-2xx status is not an error at the transport level; callers decide
/// what to do with a rejected delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// HTTP status code returned by the service
    pub status: u16,
    /// Raw response body, kept for diagnostics
    pub body: String,
}

impl Delivery {
    /// Whether the service accepted the message (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}
