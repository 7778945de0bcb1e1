//! Messaging channels for publishing wiki digests.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{MessageChannel, OutgoingMessage, YammerChannel};
//!
//! # async fn example() -> Result<(), notify::ChannelError> {
//! let channel = YammerChannel::new(notify::channels::yammer::DEFAULT_MESSAGES_URL, "token");
//! let delivery = channel.post(&OutgoingMessage::new("digest text", 12345)).await?;
//! if !delivery.is_success() {
//!     eprintln!("rejected with {}", delivery.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`MessageChannel`] trait defines the interface for messaging services
//! - [`YammerChannel`] posts to a Yammer group
//! - [`OAuthClient`] performs the one-time authorization-code exchange

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod channels;
pub mod error;
pub mod message;

pub use auth::OAuthClient;
pub use channels::yammer::YammerChannel;
pub use channels::MessageChannel;
pub use error::ChannelError;
pub use message::{Delivery, OutgoingMessage};
