//! Application state shared across handlers

use std::sync::Arc;

use docstore::DocumentStore;

use crate::{
    identity::IdentityProvider,
    jwt::JwtService,
    repositories::{ActivityRepository, ChatRepository, HealthRecordRepository, UserRepository},
    responder::Responder,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: UserRepository,
    pub activity_repository: ActivityRepository,
    pub health_record_repository: HealthRecordRepository,
    pub chat_repository: ChatRepository,
    pub jwt_service: JwtService,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub responder: Arc<dyn Responder>,
}

impl AppState {
    /// Build the state around one document store
    pub fn new(
        store: Arc<dyn DocumentStore>,
        jwt_service: JwtService,
        identity_provider: Arc<dyn IdentityProvider>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            user_repository: UserRepository::new(store.clone()),
            activity_repository: ActivityRepository::new(store.clone()),
            health_record_repository: HealthRecordRepository::new(store.clone()),
            chat_repository: ChatRepository::new(store),
            jwt_service,
            identity_provider,
            responder,
        }
    }
}
