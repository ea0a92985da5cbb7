//! User model and authentication payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{
    Validate, require_text, validate_email, validate_measurement, validate_password,
};

/// Collection holding user documents
pub const USERS: &str = "users";

/// How an account authenticates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Email and password
    Local,
    /// External identity provider
    Federated,
}

/// Notification and security preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub activity_reminders: bool,
    pub medication_alerts: bool,
    pub two_factor_auth: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            activity_reminders: false,
            medication_alerts: true,
            two_factor_auth: false,
        }
    }
}

impl Validate for UserSettings {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// User entity as stored in the `users` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string; absent for federated accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "docstore::timestamp::option"
    )]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub settings: UserSettings,
    pub provider: AuthProvider,
    /// Subject of the external identity, for federated accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub federated_id: Option<String>,
    #[serde(with = "docstore::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "docstore::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    fn blank(email: String, full_name: String, provider: AuthProvider) -> Self {
        let now = docstore::timestamp::now();
        Self {
            id: super::new_id(),
            email,
            password: None,
            full_name,
            date_of_birth: None,
            gender: String::new(),
            height: 0.0,
            weight: 0.0,
            blood_type: String::new(),
            allergies: String::new(),
            medications: String::new(),
            conditions: String::new(),
            profile_image: String::new(),
            settings: UserSettings::default(),
            provider,
            federated_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// New password account with default settings
    pub fn new_local(email: String, password_hash: String, full_name: String) -> Self {
        Self {
            password: Some(password_hash),
            ..Self::blank(email, full_name, AuthProvider::Local)
        }
    }

    /// New account backed by an external identity; the subject is kept for later sign-ins
    pub fn new_federated(subject: String, email: String, full_name: String) -> Self {
        Self {
            federated_id: Some(subject),
            ..Self::blank(email, full_name, AuthProvider::Federated)
        }
    }

    /// Copy without credential material, safe to return to clients
    pub fn redacted(mut self) -> Self {
        self.password = None;
        self.federated_id = None;
        self
    }
}

/// Identity fragment returned alongside tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub full_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// Response for login, registration and federated sign-in
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

impl AuthResponse {
    pub fn new(message: &str, token: String, user: &User) -> Self {
        Self {
            message: message.to_string(),
            token,
            user: UserSummary::from(user),
        }
    }
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        require_text("Password", &self.password)
    }
}

/// Request for user registration
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        require_text("Full name", &self.full_name)
    }
}

/// Request for sign-in with an external identity token
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedAuthRequest {
    pub id_token: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Validate for FederatedAuthRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("ID token", &self.id_token)
    }
}

/// Partial profile update; only the present fields are written
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "docstore::timestamp::option"
    )]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.full_name {
            require_text("Full name", name)?;
        }
        if let Some(height) = self.height {
            validate_measurement("Height", height)?;
        }
        if let Some(weight) = self.weight {
            validate_measurement("Weight", weight)?;
        }
        Ok(())
    }
}
