//! Verification of ID tokens issued by an external identity provider

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Identity asserted by a verified ID token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    /// Stable provider-side user id
    pub subject: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    /// The provider rejected the token, or its claims are unacceptable
    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    /// The provider could not be reached or answered unexpectedly
    #[error("Identity provider failure: {0}")]
    Provider(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_id_token(&self, id_token: &str) -> Result<FederatedIdentity, IdentityError>;
}

/// Body of the token-info endpoint; only the fields we check
#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: Option<String>,
    aud: Option<String>,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
}

impl TokenInfo {
    fn email_verified(&self) -> bool {
        match &self.email_verified {
            Some(serde_json::Value::Bool(verified)) => *verified,
            Some(serde_json::Value::String(verified)) => verified.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// Google ID token verification through the token-info endpoint
pub struct GoogleIdentityProvider {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(tokeninfo_url: impl Into<String>, client_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokeninfo_url: tokeninfo_url.into(),
            client_id,
        }
    }

    fn check(&self, info: TokenInfo) -> Result<FederatedIdentity, IdentityError> {
        if let Some(expected) = &self.client_id {
            if info.aud.as_deref() != Some(expected.as_str()) {
                return Err(IdentityError::InvalidToken("audience mismatch".to_string()));
            }
        }
        if !info.email_verified() {
            return Err(IdentityError::InvalidToken("email not verified".to_string()));
        }
        let subject = info
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| IdentityError::InvalidToken("missing subject".to_string()))?;
        let email = info
            .email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| IdentityError::InvalidToken("missing email".to_string()))?;

        Ok(FederatedIdentity {
            subject,
            email,
            display_name: info.name.filter(|name| !name.is_empty()),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<FederatedIdentity, IdentityError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            warn!("Identity provider rejected ID token with status {}", status);
            return Err(IdentityError::InvalidToken(format!(
                "provider responded {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(IdentityError::Provider(format!(
                "provider responded {}",
                status
            )));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;
        debug!("Token info received for subject {:?}", info.sub);
        self.check(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    /// Serve a fake token-info endpoint; `good` and `unverified` are known tokens
    async fn spawn_tokeninfo() -> String {
        async fn tokeninfo(
            Query(params): Query<HashMap<String, String>>,
        ) -> Result<Json<Value>, StatusCode> {
            match params.get("id_token").map(String::as_str) {
                Some("good") => Ok(Json(json!({
                    "sub": "1234567890",
                    "aud": "harbor-client",
                    "email": "ann@example.com",
                    "email_verified": "true",
                    "name": "Ann Example"
                }))),
                Some("unverified") => Ok(Json(json!({
                    "sub": "1234567890",
                    "aud": "harbor-client",
                    "email": "ann@example.com",
                    "email_verified": false
                }))),
                Some("broken") => Err(StatusCode::BAD_GATEWAY),
                _ => Err(StatusCode::BAD_REQUEST),
            }
        }

        let app = Router::new().route("/tokeninfo", get(tokeninfo));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/tokeninfo", address)
    }

    #[tokio::test]
    async fn test_valid_token_yields_identity() {
        let url = spawn_tokeninfo().await;
        let provider = GoogleIdentityProvider::new(url, Some("harbor-client".to_string()));
        let identity = provider.verify_id_token("good").await.unwrap();
        assert_eq!(
            identity,
            FederatedIdentity {
                subject: "1234567890".into(),
                email: "ann@example.com".into(),
                display_name: Some("Ann Example".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_rejections() {
        let url = spawn_tokeninfo().await;

        let wrong_audience = GoogleIdentityProvider::new(url.clone(), Some("other".to_string()));
        assert!(matches!(
            wrong_audience.verify_id_token("good").await,
            Err(IdentityError::InvalidToken(_))
        ));

        let provider = GoogleIdentityProvider::new(url, None);
        assert!(matches!(
            provider.verify_id_token("unverified").await,
            Err(IdentityError::InvalidToken(_))
        ));
        assert!(matches!(
            provider.verify_id_token("garbage").await,
            Err(IdentityError::InvalidToken(_))
        ));
        assert!(matches!(
            provider.verify_id_token("broken").await,
            Err(IdentityError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_a_provider_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let provider = GoogleIdentityProvider::new(format!("http://{}/tokeninfo", address), None);
        assert!(matches!(
            provider.verify_id_token("good").await,
            Err(IdentityError::Provider(_))
        ));
    }
}
