use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::cache::token::Token;
use crate::config::credentials::Credential;

const GRANT_TYPE: &str = "client_credentials";
const MAX_REASON_LEN: usize = 256;

#[derive(Debug, Error)]
pub enum TokenFetchError {
    #[error("token request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("token endpoint returned status {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("token response could not be decoded: {0}")]
    Decode(String),
}

impl TokenFetchError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenFetchError::Transport(_) => "transport",
            TokenFetchError::Status { .. } => "status",
            TokenFetchError::Decode(_) => "decode",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Client-credentials grant against a single token endpoint.
#[derive(Debug, Clone)]
pub struct OAuth2Source {
    pub token_url: String,
    credential: Credential,
    client: Client,
}

impl OAuth2Source {
    pub fn new(token_url: String, credential: Credential, client: Client) -> Self {
        Self { token_url, credential, client }
    }

    pub async fn fetch_token(&self) -> Result<Token, TokenFetchError> {
        let form = [
            ("grant_type", GRANT_TYPE),
            ("client_id", self.credential.client_id.as_str()),
            ("client_secret", self.credential.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(TokenFetchError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(TokenFetchError::Transport)?;
        if status != StatusCode::OK {
            return Err(TokenFetchError::Status {
                status: status.as_u16(),
                reason: truncate(&body),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| TokenFetchError::Decode(e.to_string()))?;
        debug!("token endpoint issued a token valid for {}s", parsed.expires_in);
        Ok(Token::new(parsed.access_token, parsed.expires_in))
    }
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_REASON_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_reasons_are_truncated() {
        let body = "x".repeat(MAX_REASON_LEN + 10);
        let reason = truncate(&body);
        assert_eq!(reason.len(), MAX_REASON_LEN + 3);
        assert!(reason.ends_with("..."));
        assert_eq!(truncate("  invalid_client \n"), "invalid_client");
    }
}
