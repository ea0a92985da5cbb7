//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Authentication middleware
///
/// Rejects the request with `401` unless it carries a valid bearer token;
/// otherwise the caller's [`AuthUser`] is placed in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        warn!("Rejected request to {} without bearer token", req.uri().path());
        return Err(ApiError::unauthorized());
    };

    let claims = state.jwt_service.verify(bearer.token()).map_err(|e| {
        warn!("Rejected token for {}: {}", req.uri().path(), e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(req).await)
}
