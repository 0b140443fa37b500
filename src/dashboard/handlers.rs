use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use super::dto::{DashboardResponse, UserInfo};
use super::{repo, services};
use crate::auth::jwt::AuthUser;
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::nutrition::calculator::age_on;
use crate::nutrition::macros;
use crate::profiles;
use crate::profiles::dto::BmiAnalysis;
use crate::state::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard/nutrition-metrics", get(nutrition_metrics))
}

/// One-call roll-up for the client dashboard: profile metrics, today's
/// consumption, caloric status and the weekly view.
#[instrument(skip(state))]
pub async fn nutrition_metrics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let profile = profiles::repo::get_profile(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("profile"))?;

    let today = OffsetDateTime::now_utc().date();
    let strategy = state.config.nutrition.default_strategy;
    let calorie_targets = strategy.calorie_targets(&profile, today)?;
    let macro_targets = macros::allocate(calorie_targets.rcde, profile.goal, strategy);

    let today_rows = repo::nutrients_for_date(&state.db, user_id, today).await?;
    let today_consumption = services::summarize_today(&today_rows);
    let caloric_compliance =
        services::caloric_compliance(today_consumption.total_calories, calorie_targets.rcde);

    let week_start = services::week_start(today);
    let week_totals = repo::day_totals(&state.db, user_id, week_start, today).await?;
    let days_elapsed = (today - week_start).whole_days() as usize + 1;
    let weekly_adherence = services::weekly_adherence(week_totals.len(), days_elapsed);

    let series_start = today - time::Duration::days(6);
    let series_totals = repo::day_totals(&state.db, user_id, series_start, today).await?;
    let week_daily_consumption =
        services::week_series(&series_totals, today, calorie_targets.rcde);

    Ok(Json(DashboardResponse {
        user: UserInfo {
            name: format!("{} {}", user.first_name, user.last_name),
            age: age_on(user.birth_date, today),
            height_cm: profile.height_cm,
            weight_current_kg: profile.weight_current_kg,
            weight_goal_kg: profile.weight_goal_kg,
            activity_level: profile.activity_level,
            goal: profile.goal,
        },
        calorie_targets,
        macro_targets,
        bmi: BmiAnalysis::from_profile(&profile),
        today_consumption,
        caloric_compliance,
        weekly_adherence,
        week_daily_consumption,
    }))
}
