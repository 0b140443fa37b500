use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dto::{BmiAnalysis, ProfileMetrics, StrategyQuery, UpsertProfileRequest};
use super::repo;
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::nutrition::macros;
use crate::nutrition::types::Profile;
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(put_profile))
        .route("/profile/metrics", get(get_metrics))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = repo::get_profile(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    if payload.height_cm <= 0.0
        || payload.weight_current_kg <= 0.0
        || payload.weight_goal_kg <= 0.0
    {
        return Err(ApiError::Validation(
            "height and weights must be positive".into(),
        ));
    }

    repo::upsert_profile(
        &state.db,
        user_id,
        payload.height_cm,
        payload.weight_current_kg,
        payload.weight_goal_kg,
        payload.activity_level,
        payload.goal,
    )
    .await?;

    info!(user_id = %user_id, "profile updated");
    let profile = repo::get_profile(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile))
}

/// Derived metabolic values; always recomputed from the profile, never stored.
#[instrument(skip(state))]
pub async fn get_metrics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<StrategyQuery>,
) -> Result<Json<ProfileMetrics>, ApiError> {
    let profile = repo::get_profile(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("profile"))?;

    let strategy = query
        .strategy
        .unwrap_or(state.config.nutrition.default_strategy);
    let today = OffsetDateTime::now_utc().date();
    let calorie_targets = strategy.calorie_targets(&profile, today)?;
    let macro_targets = macros::allocate(calorie_targets.rcde, profile.goal, strategy);

    Ok(Json(ProfileMetrics {
        strategy,
        calorie_targets,
        macro_targets,
        bmi: BmiAnalysis::from_profile(&profile),
    }))
}
