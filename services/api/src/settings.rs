//! Service settings loaded from `HARBOR_`-prefixed environment variables

use serde::Deserialize;

use crate::{jwt::DEFAULT_TOKEN_EXPIRY, responder::DEFAULT_AI_ENDPOINT};

pub const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Which document store backend to run against
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

/// Reply source for chat messages without a keyword match
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatFallback {
    /// Forward to the text-generation endpoint
    #[default]
    Generator,
    /// Fixed general-guidance reply, for deployments without a generator
    Canned,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Required at startup; kept optional here so the error is explicit
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry: u64,
    #[serde(default)]
    pub store_backend: StoreBackend,
    /// Text-generation endpoint for chat replies without a keyword match
    #[serde(default = "default_ai_endpoint")]
    pub ai_endpoint: String,
    #[serde(default)]
    pub chat_fallback: ChatFallback,
    /// Expected audience of federated ID tokens
    #[serde(default)]
    pub google_client_id: Option<String>,
    #[serde(default = "default_tokeninfo_url")]
    pub google_tokeninfo_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_jwt_expiry() -> u64 {
    DEFAULT_TOKEN_EXPIRY
}

fn default_ai_endpoint() -> String {
    DEFAULT_AI_ENDPOINT.to_string()
}

fn default_tokeninfo_url() -> String {
    DEFAULT_TOKENINFO_URL.to_string()
}

impl Settings {
    /// Load settings from the environment
    ///
    /// # Environment Variables
    /// - `HARBOR_HOST` / `HARBOR_PORT`: listen address (default `0.0.0.0:8001`)
    /// - `HARBOR_JWT_SECRET`: HMAC secret for session tokens
    /// - `HARBOR_JWT_EXPIRY`: token lifetime in seconds (default 86400)
    /// - `HARBOR_STORE_BACKEND`: `postgres` (default) or `memory`
    /// - `HARBOR_AI_ENDPOINT`: chat text-generation endpoint
    ///   (default `http://localhost:8000/query`)
    /// - `HARBOR_CHAT_FALLBACK`: `generator` (default) or `canned`
    /// - `HARBOR_GOOGLE_CLIENT_ID`: optional expected ID token audience
    /// - `HARBOR_GOOGLE_TOKENINFO_URL`: token-info endpoint override
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("HARBOR").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
