//! Access token validation collaborator
//!
//! The verdict only gates private module output. Tokens are opaque here.

use crate::error::TokenError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Answer from a token validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenVerdict {
    pub valid: bool,
}

/// Checks bearer tokens
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate one token
    async fn validate(&self, token: &str) -> Result<TokenVerdict, TokenError>;
}

/// Accepts a fixed set of tokens
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    allowed: HashSet<String>,
}

impl StaticTokenValidator {
    /// Validator accepting exactly `tokens`
    #[must_use]
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Validator that rejects everything
    #[inline]
    #[must_use]
    pub fn deny_all() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<TokenVerdict, TokenError> {
        Ok(TokenVerdict {
            valid: self.allowed.contains(token),
        })
    }
}

#[derive(Serialize)]
struct ValidateRequest<'a> {
    token: &'a str,
}

/// Posts `{"token": ...}` to a validation endpoint and reads `{"valid": ...}`
#[derive(Debug, Clone)]
pub struct HttpTokenValidator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenValidator {
    /// Validator for `endpoint` with a request timeout
    ///
    /// # Errors
    /// [`TokenError::Unreachable`] if the HTTP client cannot be built
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TokenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TokenError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, token: &str) -> Result<TokenVerdict, TokenError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ValidateRequest { token })
            .send()
            .await
            .map_err(|e| TokenError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "token service rejected request");
            return Err(TokenError::BadStatus {
                status: status.as_u16(),
            });
        }

        response
            .json::<TokenVerdict>()
            .await
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_validator_checks_membership() {
        let validator = StaticTokenValidator::new(["t-1", "t-2"]);
        assert!(validator.validate("t-1").await.unwrap().valid);
        assert!(!validator.validate("t-3").await.unwrap().valid);
        assert!(!StaticTokenValidator::deny_all().validate("t-1").await.unwrap().valid);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_reported() {
        let validator =
            HttpTokenValidator::new("http://127.0.0.1:9/validate", Duration::from_millis(200))
                .unwrap();
        assert!(matches!(
            validator.validate("t").await,
            Err(TokenError::Unreachable(_))
        ));
    }

    #[test]
    fn verdict_wire_shape() {
        let verdict: TokenVerdict = serde_json::from_str(r#"{"valid": true}"#).unwrap();
        assert!(verdict.valid);
        assert_eq!(
            serde_json::to_string(&ValidateRequest { token: "abc" }).unwrap(),
            r#"{"token":"abc"}"#
        );
    }
}
