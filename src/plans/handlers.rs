use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use time::{Date, OffsetDateTime};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    ComplianceStatusResponse, CreatePlanRequest, DeletePlanResponse, GeneratePlanRequest,
    GeneratePlanResponse, PlanListQuery, PlanResponse,
};
use super::{repo, services};
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/by-date/:date", get(get_plan_by_date))
        .route("/plans/status/:date", get(plan_status))
        .route("/plans/generate", post(generate_plan))
        .route("/plans/:id", delete(delete_plan))
        .route("/plans/:id/force", delete(force_delete_plan))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanResponse>), ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let plan = services::create_plan(&state, user_id, payload, today).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<PlanListQuery>,
) -> Result<Json<Vec<PlanResponse>>, ApiError> {
    let plans =
        repo::list_by_owner(&state.db, user_id, query.date, query.from, query.to).await?;
    let mut out = Vec::with_capacity(plans.len());
    for plan in plans {
        out.push(services::plan_response(&state, plan).await?);
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn get_plan_by_date(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
) -> Result<Json<PlanResponse>, ApiError> {
    let plan = repo::find_by_owner_and_date(&state.db, user_id, date)
        .await?
        .ok_or(ApiError::NoPlanForDate(date))?;
    Ok(Json(services::plan_response(&state, plan).await?))
}

#[instrument(skip(state))]
pub async fn plan_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
) -> Result<Json<ComplianceStatusResponse>, ApiError> {
    let status = services::compliance_for_date(&state, user_id, date).await?;
    Ok(Json(status))
}

#[instrument(skip(state, payload))]
pub async fn generate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GeneratePlanRequest>,
) -> Result<Json<GeneratePlanResponse>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let mut rng = StdRng::from_entropy();
    let proposal =
        services::generate_proposal(&state, user_id, payload, today, &mut rng).await?;
    Ok(Json(proposal))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletePlanResponse>, ApiError> {
    let outcome = services::delete_plan(&state, user_id, id, false).await?;
    Ok(Json(outcome))
}

#[instrument(skip(state))]
pub async fn force_delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletePlanResponse>, ApiError> {
    let outcome = services::delete_plan(&state, user_id, id, true).await?;
    Ok(Json(outcome))
}
