//! Health record listing, creation and deletion

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    extract::Payload,
    middleware::AuthUser,
    models::health_record::{HealthRecord, NewHealthRecord},
    state::AppState,
};

pub async fn list_health_records(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<HealthRecord>>> {
    let records = state
        .health_record_repository
        .list_for_user(&auth.id)
        .await?;
    Ok(Json(records))
}

pub async fn create_health_record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Payload(record): Payload<NewHealthRecord>,
) -> ApiResult<impl IntoResponse> {
    let record = record.into_record(&auth.id);
    state.health_record_repository.create(&record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete a record after checking that the caller owns it
pub async fn delete_health_record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .health_record_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Health record not found".to_string()))?;

    if record.user_id != auth.id {
        warn!(
            "User {} ({}) attempted to delete health record {} of another user",
            auth.id, auth.email, id
        );
        return Err(ApiError::Forbidden(
            "Not authorized to delete this record".to_string(),
        ));
    }

    state.health_record_repository.delete(&id).await?;
    info!("Deleted health record {}", id);

    Ok(Json(json!({
        "message": "Health record deleted successfully"
    })))
}
