//! Activity logging and summary

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Duration;

use crate::{
    error::{ApiError, ApiResult},
    extract::{Params, Payload},
    middleware::AuthUser,
    models::activity::{
        ActivityQuery, ActivityRecord, ActivitySummary, NewActivity, SummaryQuery, start_of_day,
    },
    state::AppState,
};

/// Activities of the caller in a date window, newest first
pub async fn list_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Params(query): Params<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityRecord>>> {
    let (from, to) = query
        .window(docstore::timestamp::now())
        .map_err(ApiError::Validation)?;
    let limit = query.limit().map_err(ApiError::Validation)?;

    let records = state
        .activity_repository
        .list(&auth.id, from, to, query.kind, Some(limit))
        .await?;
    Ok(Json(records))
}

pub async fn create_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Payload(activity): Payload<NewActivity>,
) -> ApiResult<impl IntoResponse> {
    let record = activity.into_record(&auth.id);
    state.activity_repository.create(&record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Today's totals and the trailing `days` window, ending with today
pub async fn activity_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Params(query): Params<SummaryQuery>,
) -> ApiResult<Json<ActivitySummary>> {
    let days = query.days().map_err(ApiError::Validation)?;
    let today = start_of_day(docstore::timestamp::now());
    let from = today - Duration::days(days - 1);
    let to = today + Duration::days(1);

    let records = state
        .activity_repository
        .list(&auth.id, from, to, None, None)
        .await?;
    Ok(Json(ActivitySummary::from_records(&records, today, days)))
}
