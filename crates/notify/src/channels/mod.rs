//! Messaging channel implementations.

pub mod yammer;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::message::{Delivery, OutgoingMessage};

/// Trait for messaging channels the digest can be published to.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is enabled/configured.
    fn enabled(&self) -> bool;

    /// Post a message.
    ///
    /// Transport failures are errors; a response with any status is a
    /// [`Delivery`].
    async fn post(&self, message: &OutgoingMessage) -> Result<Delivery, ChannelError>;
}
