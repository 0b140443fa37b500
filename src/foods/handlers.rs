use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::CreateFoodRequest;
use super::repo::{self, Food};
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route("/foods/:id", get(get_food).delete(delete_food))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<Food>>, ApiError> {
    let foods = repo::list(&state.db).await?;
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Food>, ApiError> {
    let food = repo::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("food"))?;
    Ok(Json(food))
}

#[instrument(skip(state, payload))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateFoodRequest>,
) -> Result<(StatusCode, Json<Food>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let name = payload.name.trim();
    if repo::find_by_name(&state.db, name).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "a food named '{name}' already exists"
        )));
    }

    let food = repo::create(
        &state.db,
        name,
        payload.description.as_deref(),
        payload.calories_per_portion,
        payload.protein_per_portion,
        payload.fat_per_portion,
        payload.carbs_per_portion,
        payload.portion_unit.trim(),
    )
    .await?;

    info!(food_id = %food.id, name = %food.name, created_by = %user_id, "food created");
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = repo::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("food"));
    }
    Ok(StatusCode::NO_CONTENT)
}
