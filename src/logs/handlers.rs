use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreateLogsResponse, LogEntryRequest, LogListQuery};
use super::repo::LogEntryDetail;
use super::{repo, services};
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/food-logs", get(list_logs).post(create_logs))
        .route("/food-logs/:id", axum::routing::delete(delete_log))
}

#[instrument(skip(state, payload))]
pub async fn create_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<Vec<LogEntryRequest>>,
) -> Result<(StatusCode, Json<CreateLogsResponse>), ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let entries = services::log_batch(&state, user_id, payload, today).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateLogsResponse {
            message: format!("{} entries recorded", entries.len()),
            entries,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<LogListQuery>,
) -> Result<Json<Vec<LogEntryDetail>>, ApiError> {
    let date = query
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let entries = repo::list_for_date(&state.db, user_id, date).await?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = repo::delete_entry(&state.db, user_id, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("food log entry"));
    }
    Ok(StatusCode::NO_CONTENT)
}
