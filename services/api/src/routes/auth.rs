//! Login, registration and federated sign-in

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    extract::Payload,
    identity::IdentityError,
    models::user::{
        AuthProvider, AuthResponse, FederatedAuthRequest, LoginRequest, RegisterRequest, User,
    },
    repositories::UserRepository,
    state::AppState,
    validation::normalize_email,
};

fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    state
        .jwt_service
        .issue(&user.id, &user.email)
        .map_err(|e| ApiError::Internal(format!("Failed to issue token: {}", e)))
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".to_string())
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Payload(payload): Payload<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = normalize_email(&payload.email);
    info!("Login attempt for user: {}", email);

    let user = state
        .user_repository
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if user.provider == AuthProvider::Federated && user.password.is_none() {
        warn!("Password login attempted for federated account {}", user.id);
        return Err(ApiError::Unauthorized(
            "Please use federated sign-in".to_string(),
        ));
    }

    if !UserRepository::verify_password(&user, &payload.password)? {
        warn!("Wrong password for user {}", user.id);
        return Err(invalid_credentials());
    }

    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse::new("Login successful", token, &user)))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Payload(payload): Payload<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = normalize_email(&payload.email);

    if state.user_repository.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = UserRepository::hash_password(&payload.password)?;
    let user = User::new_local(email, password_hash, payload.full_name.trim().to_string());
    state.user_repository.create(&user).await?;
    info!("Registered user {}", user.id);

    let token = issue_token(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("User registered successfully", token, &user)),
    ))
}

/// Sign-in with an ID token from the external identity provider
pub async fn federated(
    State(state): State<AppState>,
    Payload(payload): Payload<FederatedAuthRequest>,
) -> ApiResult<impl IntoResponse> {
    let identity = state
        .identity_provider
        .verify_id_token(&payload.id_token)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidToken(reason) => {
                warn!("Federated sign-in rejected: {}", reason);
                ApiError::Unauthorized("Invalid ID token".to_string())
            }
            IdentityError::Provider(detail) => ApiError::Upstream(detail),
        })?;

    let email = normalize_email(&identity.email);
    let linked = match state
        .user_repository
        .find_by_federated_id(&identity.subject)
        .await?
    {
        Some(user) => Some(user),
        None => state.user_repository.find_by_email(&email).await?,
    };
    let user = match linked {
        Some(existing) => existing,
        None => {
            let full_name = payload
                .full_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .or(identity.display_name)
                .unwrap_or_default();
            let user = User::new_federated(identity.subject, email, full_name);
            state.user_repository.create(&user).await?;
            info!("Created federated user {}", user.id);
            user
        }
    };

    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse::new(
        "Authentication successful",
        token,
        &user,
    )))
}
