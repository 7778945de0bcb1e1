//! Error types for messaging channels.

use thiserror::Error;

/// Errors that can occur when talking to a messaging service.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel is not configured
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Token endpoint rejected the exchange
    #[error("Token exchange failed with {status}: {body}")]
    TokenExchange { status: u16, body: String },
}
