//! Profile and settings of the authenticated user

use axum::{Extension, Json, extract::State};

use crate::{
    error::{ApiError, ApiResult},
    extract::Payload,
    middleware::AuthUser,
    models::user::{ProfileUpdate, User, UserSettings},
    state::AppState,
};

async fn current_user(state: &AppState, auth: &AuthUser) -> ApiResult<User> {
    state
        .user_repository
        .find_by_id(&auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<User>> {
    let user = current_user(&state, &auth).await?;
    Ok(Json(user.redacted()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Payload(update): Payload<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    let user = state
        .user_repository
        .update_profile(&auth.id, &update)
        .await?;
    Ok(Json(user.redacted()))
}

pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<UserSettings>> {
    let user = current_user(&state, &auth).await?;
    Ok(Json(user.settings))
}

/// Replace all notification and security preferences
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Payload(settings): Payload<UserSettings>,
) -> ApiResult<Json<UserSettings>> {
    state
        .user_repository
        .update_settings(&auth.id, &settings)
        .await?;
    Ok(Json(settings))
}
