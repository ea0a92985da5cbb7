//! User repository for document store operations

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use docstore::{DocumentStore, Query, StoreError, from_document, to_document};
use serde_json::Value;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::user::{ProfileUpdate, USERS, User, UserSettings},
};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist a new user; a taken email surfaces as a conflict
    pub async fn create(&self, user: &User) -> ApiResult<()> {
        info!("Creating new user: {}", user.id);
        self.store.set(USERS, &user.id, to_document(user)?).await?;
        Ok(())
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        match self.store.get(USERS, id).await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Find a user by normalized email
    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let query = Query::new().where_eq("email", email).limit(1);
        let mut documents = self.store.query(USERS, &query).await?;
        Ok(documents.decode_next::<User>()?)
    }

    /// Find the account linked to an external identity subject
    pub async fn find_by_federated_id(&self, subject: &str) -> ApiResult<Option<User>> {
        let query = Query::new().where_eq("federatedId", subject).limit(1);
        let mut documents = self.store.query(USERS, &query).await?;
        Ok(documents.decode_next::<User>()?)
    }

    /// Apply the present profile fields and return the updated user
    pub async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> ApiResult<User> {
        let mut fields = to_document(update)?;
        fields.insert(
            "updatedAt".to_string(),
            docstore::timestamp::value(&docstore::timestamp::now()),
        );
        self.patch(id, fields).await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Replace the settings sub-record
    pub async fn update_settings(&self, id: &str, settings: &UserSettings) -> ApiResult<()> {
        let mut fields = docstore::Document::new();
        fields.insert(
            "settings".to_string(),
            Value::Object(to_document(settings)?),
        );
        fields.insert(
            "updatedAt".to_string(),
            docstore::timestamp::value(&docstore::timestamp::now()),
        );
        self.patch(id, fields).await
    }

    async fn patch(&self, id: &str, fields: docstore::Document) -> ApiResult<()> {
        match self.store.update(USERS, id, fields).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(ApiError::NotFound("User not found".to_string())),
            Err(err) => Err(err.into()),
        }
    }

    /// Hash a plaintext password into an argon2 PHC string
    pub fn hash_password(password: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();
        Ok(password_hash)
    }

    /// Verify a user's password; accounts without a hash never match
    pub fn verify_password(user: &User, password: &str) -> ApiResult<bool> {
        let Some(stored) = user.password.as_deref() else {
            return Ok(false);
        };
        let parsed_hash = PasswordHash::new(stored)
            .map_err(|e| ApiError::Internal(format!("Failed to parse password hash: {}", e)))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore::MemoryStore;

    fn repository() -> UserRepository {
        UserRepository::new(Arc::new(MemoryStore::new().with_unique(USERS, "email")))
    }

    #[tokio::test]
    async fn test_create_and_find_by_email() -> ApiResult<()> {
        let users = repository();
        let hash = UserRepository::hash_password("secret1")?;
        let user = User::new_local("ann@example.com".into(), hash, "Ann".into());
        users.create(&user).await?;

        let found = users.find_by_email("ann@example.com").await?.unwrap();
        assert_eq!(found, user);
        assert!(users.find_by_email("bob@example.com").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() -> ApiResult<()> {
        let users = repository();
        users
            .create(&User::new_local("ann@example.com".into(), "h".into(), "Ann".into()))
            .await?;
        let second = users
            .create(&User::new_local("ann@example.com".into(), "h".into(), "Ann 2".into()))
            .await;
        assert!(matches!(second, Err(ApiError::Conflict(_))));
        Ok(())
    }

    #[test]
    fn test_password_hash_round_trip() -> ApiResult<()> {
        let hash = UserRepository::hash_password("secret1")?;
        assert!(hash.starts_with("$argon2"));
        let user = User::new_local("ann@example.com".into(), hash, "Ann".into());
        assert!(UserRepository::verify_password(&user, "secret1")?);
        assert!(!UserRepository::verify_password(&user, "secret2")?);

        let federated = User::new_federated("sub".into(), "ann@example.com".into(), "Ann".into());
        assert!(!UserRepository::verify_password(&federated, "secret1")?);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_touches_only_given_fields() -> ApiResult<()> {
        let users = repository();
        let mut user = User::new_local("ann@example.com".into(), "h".into(), "Ann".into());
        user.blood_type = "O+".into();
        users.create(&user).await?;

        let update = ProfileUpdate {
            weight: Some(61.5),
            ..Default::default()
        };
        let updated = users.update_profile(&user.id, &update).await?;
        assert_eq!(updated.weight, 61.5);
        assert_eq!(updated.blood_type, "O+");
        assert_eq!(updated.full_name, "Ann");
        assert!(updated.updated_at >= user.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let users = repository();
        let result = users
            .update_settings("missing", &UserSettings::default())
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
