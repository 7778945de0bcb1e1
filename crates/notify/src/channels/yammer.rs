//! Yammer group message channel.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::message::{Delivery, OutgoingMessage};
use crate::MessageChannel;

/// Default messages endpoint of the Yammer REST API.
pub const DEFAULT_MESSAGES_URL: &str = "https://www.yammer.com/api/v1/messages.json";

/// Posts messages to a Yammer group with a bearer token.
pub struct YammerChannel {
    messages_url: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl YammerChannel {
    /// Create a Yammer channel for the given endpoint and token.
    #[must_use]
    pub fn new(messages_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let access_token = access_token.into();
        Self {
            messages_url: messages_url.into(),
            access_token: (!access_token.is_empty()).then_some(access_token),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MessageChannel for YammerChannel {
    fn name(&self) -> &'static str {
        "yammer"
    }

    fn enabled(&self) -> bool {
        self.access_token.is_some()
    }

    async fn post(&self, message: &OutgoingMessage) -> Result<Delivery, ChannelError> {
        let token = self
            .access_token
            .as_ref()
            .ok_or_else(|| ChannelError::NotConfigured("access_token".to_string()))?;

        debug!(
            channel = "yammer",
            group_id = message.group_id,
            bytes = message.body.len(),
            "Posting message"
        );

        let group_id = message.group_id.to_string();
        let response = self
            .client
            .post(&self.messages_url)
            .bearer_auth(token)
            .form(&[("body", message.body.as_str()), ("group_id", group_id.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            debug!(channel = "yammer", status = %status, "Message posted");
        } else {
            warn!(
                channel = "yammer",
                status = %status,
                body = %body,
                "Yammer rejected the message"
            );
        }

        Ok(Delivery {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_sends_form_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/messages.json"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_string_contains("group_id=42"))
            .and(body_string_contains("body=hello"))
            .respond_with(ResponseTemplate::new(201).set_body_string("{\"messages\":[]}"))
            .expect(1)
            .mount(&server)
            .await;

        let channel = YammerChannel::new(
            format!("{}/api/v1/messages.json", server.uri()),
            "secret-token",
        );
        let delivery = channel
            .post(&OutgoingMessage::new("hello", 42))
            .await
            .unwrap();

        assert!(delivery.is_success());
        assert_eq!(delivery.status, 201);
    }

    #[tokio::test]
    async fn test_rejected_post_is_a_delivery_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let channel = YammerChannel::new(server.uri(), "expired");
        let delivery = channel
            .post(&OutgoingMessage::new("hello", 1))
            .await
            .unwrap();

        assert!(!delivery.is_success());
        assert_eq!(delivery.status, 401);
        assert_eq!(delivery.body, "invalid token");
    }

    #[tokio::test]
    async fn test_missing_token_is_not_configured() {
        let channel = YammerChannel::new(DEFAULT_MESSAGES_URL, "");
        assert!(!channel.enabled());

        let err = channel
            .post(&OutgoingMessage::new("hello", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::NotConfigured(_)));
    }
}
