//! Shared fixtures for router tests

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, header},
    response::Response,
};
use docstore::{
    Document, DocumentStore, Documents, MemoryStore, Query, StoreError, StoreResult,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{
    identity::{FederatedIdentity, IdentityError, IdentityProvider},
    jwt::{Claims, JwtConfig, JwtService},
    models::user::USERS,
    responder::{CannedResponder, KeywordResponder, Responder},
    routes::create_router,
    state::AppState,
};

pub const TEST_SECRET: &str = "test-secret";

/// Identity provider answering from a fixed table
///
/// `google-<name>` tokens are valid for `<name>@example.com`, and
/// `google-<name>:<alias>` keeps the subject of `<name>` with the email
/// `<alias>@example.com`. `provider-down` simulates an outage, anything else
/// is rejected.
pub struct StaticIdentityProvider;

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<FederatedIdentity, IdentityError> {
        if id_token == "provider-down" {
            return Err(IdentityError::Provider("connection refused".to_string()));
        }
        match id_token.strip_prefix("google-") {
            Some(token) if !token.is_empty() => {
                let (name, alias) = token.split_once(':').unwrap_or((token, token));
                Ok(FederatedIdentity {
                    subject: format!("google-subject-{}", name),
                    email: format!("{}@Example.com", alias),
                    display_name: Some(format!("{} from Google", name)),
                })
            }
            _ => Err(IdentityError::InvalidToken("unknown token".to_string())),
        }
    }
}

/// Store whose every operation fails
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn get(&self, _: &str, _: &str) -> StoreResult<Option<Document>> {
        Err(StoreError::Configuration("store offline".to_string()))
    }

    async fn set(&self, _: &str, _: &str, _: Document) -> StoreResult<()> {
        Err(StoreError::Configuration("store offline".to_string()))
    }

    async fn update(&self, _: &str, _: &str, _: Document) -> StoreResult<()> {
        Err(StoreError::Configuration("store offline".to_string()))
    }

    async fn delete(&self, _: &str, _: &str) -> StoreResult<()> {
        Err(StoreError::Configuration("store offline".to_string()))
    }

    async fn query(&self, _: &str, _: &Query) -> StoreResult<Documents> {
        Err(StoreError::Configuration("store offline".to_string()))
    }
}

pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_responder(Arc::new(KeywordResponder::with_defaults(Arc::new(
            CannedResponder,
        ))))
    }

    pub fn with_responder(responder: Arc<dyn Responder>) -> Self {
        let store = Arc::new(MemoryStore::new().with_unique(USERS, "email"));
        let router = create_router(state(store.clone(), responder));
        Self { router, store }
    }

    /// Router over an arbitrary store; `store` is an unrelated empty one
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let router = create_router(state(store, Arc::new(CannedResponder)));
        Self {
            router,
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send an unparsed JSON body without credentials
    pub async fn send_raw(&self, method: Method, path: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register a local account, returning its token and user id
    pub async fn register(&self, email: &str) -> (String, String) {
        let response = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "secret1",
                    "fullName": "Test User"
                })),
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        let body = read_json(response).await;
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Correctly signed token that expired a minute ago
    pub fn expired_token(&self, user_id: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims {
            sub: user_id.to_string(),
            email: "expired@example.com".to_string(),
            iat: now - 3600,
            exp: now - 60,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }
}

fn state(store: Arc<dyn DocumentStore>, responder: Arc<dyn Responder>) -> AppState {
    let jwt_service = JwtService::new(JwtConfig {
        secret: TEST_SECRET.to_string(),
        token_expiry: 3600,
    })
    .unwrap();
    AppState::new(store, jwt_service, Arc::new(StaticIdentityProvider), responder)
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
