//! OAuth authorization-code exchange for obtaining an access token.
//!
//! This is a one-time setup step: the operator authorizes the app in a
//! browser, receives a code, and exchanges it here for the long-lived token
//! that goes into the config file.

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ChannelError;

/// Default token endpoint of the Yammer OAuth API.
pub const DEFAULT_TOKEN_URL: &str = "https://www.yammer.com/oauth2/access_token.json";

/// Client for the OAuth token endpoint.
pub struct OAuthClient {
    token_url: String,
    client_id: String,
    client_secret: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: AccessToken,
}

/// Yammer nests the token in an object; plain OAuth servers return a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccessToken {
    Plain(String),
    Nested { token: String },
}

impl AccessToken {
    fn into_token(self) -> String {
        match self {
            Self::Plain(token) | Self::Nested { token } => token,
        }
    }
}

impl OAuthClient {
    #[must_use]
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, ChannelError> {
        debug!(token_url = %self.token_url, "Exchanging authorization code");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChannelError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        info!("Access token obtained");
        Ok(parsed.access_token.into_token())
    }
}
