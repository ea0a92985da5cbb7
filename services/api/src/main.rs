use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod extract;
mod identity;
mod jwt;
mod middleware;
mod models;
mod repositories;
mod responder;
mod routes;
mod settings;
mod state;
mod validation;

#[cfg(test)]
mod testing;

use docstore::{
    DocumentStore, MemoryStore, PgDocumentStore,
    database::{DatabaseConfig, health_check, init_pool},
};
use tokio::net::TcpListener;

use crate::{
    identity::GoogleIdentityProvider,
    jwt::{JwtConfig, JwtService},
    models::user::USERS,
    responder::chat_responder,
    settings::{ChatFallback, Settings, StoreBackend},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Health Harbor API service");

    let settings = Settings::from_env().context("failed to load settings")?;

    let store = connect_store(settings.store_backend).await?;

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig {
        secret: settings.jwt_secret.clone().unwrap_or_default(),
        token_expiry: settings.jwt_expiry,
    })
    .context("HARBOR_JWT_SECRET must be set")?;
    info!("Session tokens expire after {}s", jwt_service.token_expiry());

    let identity_provider = Arc::new(GoogleIdentityProvider::new(
        settings.google_tokeninfo_url.clone(),
        settings.google_client_id.clone(),
    ));

    match settings.chat_fallback {
        ChatFallback::Generator => {
            info!("Unmatched chat messages go to {}", settings.ai_endpoint)
        }
        ChatFallback::Canned => info!("Unmatched chat messages get the canned reply"),
    }
    let responder = chat_responder(&settings);

    let app_state = AppState::new(store, jwt_service, identity_provider, responder);

    // Start the web server
    let app = routes::create_router(app_state);

    let address = settings.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_store(backend: StoreBackend) -> Result<Arc<dyn DocumentStore>> {
    match backend {
        StoreBackend::Postgres => {
            // Initialize database connection pool
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            // Check database connectivity
            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            let store = PgDocumentStore::new(pool);
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory document store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new().with_unique(USERS, "email")))
        }
    }
}
