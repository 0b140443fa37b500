use rand::Rng;
use time::Date;
use tracing::info;
use uuid::Uuid;

use super::dto::{
    ComplianceStatusResponse, CreatePlanRequest, DeletePlanResponse, GeneratePlanRequest,
    GeneratePlanResponse, PlanResponse,
};
use super::repo::{self, NutritionPlan};
use crate::error::ApiError;
use crate::nutrition::{compliance, macros, planner};
use crate::state::AppState;
use crate::{foods, logs, profiles};

/// Owner and authoring nutritionist may manage a plan; nobody else.
pub fn ensure_can_manage(plan: &NutritionPlan, acting_user: Uuid) -> Result<(), ApiError> {
    if plan.owner_id == acting_user || plan.nutritionist_id == Some(acting_user) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn status_line(fulfilled: usize, total: usize) -> String {
    format!("{fulfilled}/{total} meals fulfilled")
}

pub async fn create_plan(
    state: &AppState,
    acting_user: Uuid,
    payload: CreatePlanRequest,
    today: Date,
) -> Result<PlanResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("plan name must not be empty".into()));
    }
    if payload.plan_date < today {
        return Err(ApiError::Validation(
            "plan date must not be in the past".into(),
        ));
    }
    if payload.meals.iter().any(|m| m.planned_portion <= 0.0) {
        return Err(ApiError::Validation(
            "planned portion must be positive".into(),
        ));
    }

    let owner_id = payload.owner_id.unwrap_or(acting_user);
    let nutritionist_id = (owner_id != acting_user).then_some(acting_user);

    if repo::find_by_owner_and_date(&state.db, owner_id, payload.plan_date)
        .await?
        .is_some()
    {
        return Err(ApiError::PlanAlreadyExists(payload.plan_date));
    }

    let mut food_ids: Vec<Uuid> = payload.meals.iter().map(|m| m.food_id).collect();
    food_ids.sort_unstable();
    food_ids.dedup();
    if !food_ids.is_empty()
        && foods::repo::count_existing(&state.db, &food_ids).await? != food_ids.len() as i64
    {
        return Err(ApiError::NotFound("food"));
    }

    let mut tx = state.db.begin().await?;
    let plan = repo::insert_plan(
        &mut tx,
        owner_id,
        nutritionist_id,
        payload.plan_date,
        payload.name.trim(),
        payload.description.as_deref(),
    )
    .await?;
    for meal in &payload.meals {
        repo::insert_plan_meal(&mut tx, plan.id, meal.food_id, meal.meal_slot, meal.planned_portion)
            .await?;
    }
    tx.commit().await?;

    info!(plan_id = %plan.id, owner_id = %owner_id, date = %plan.plan_date, "plan created");
    plan_response(state, plan).await
}

pub async fn plan_response(
    state: &AppState,
    plan: NutritionPlan,
) -> Result<PlanResponse, ApiError> {
    let meals = repo::meals_for_plan(&state.db, plan.id).await?;
    Ok(PlanResponse {
        id: plan.id,
        owner_id: plan.owner_id,
        nutritionist_id: plan.nutritionist_id,
        plan_date: plan.plan_date,
        name: plan.name,
        description: plan.description,
        created_at: plan.created_at,
        meals,
    })
}

/// Read-side reconciliation: re-aggregates logged portions against the plan
/// on every call; nothing is cached between the two tables.
pub async fn compliance_for_date(
    state: &AppState,
    owner_id: Uuid,
    date: Date,
) -> Result<ComplianceStatusResponse, ApiError> {
    let plan = repo::find_by_owner_and_date(&state.db, owner_id, date)
        .await?
        .ok_or(ApiError::NoPlanForDate(date))?;
    let meals = repo::planned_meals(&state.db, plan.id).await?;
    let consumed = logs::repo::consumed_portions(&state.db, owner_id, date).await?;

    let report = compliance::reconcile(&meals, &consumed);
    Ok(ComplianceStatusResponse {
        plan_id: plan.id,
        plan_name: plan.name,
        plan_date: plan.plan_date,
        status: status_line(report.fulfilled_count, report.total_planned),
        report,
    })
}

/// Propose a plan for a date without persisting it; the client submits the
/// result through the regular create endpoint once accepted.
pub async fn generate_proposal(
    state: &AppState,
    user_id: Uuid,
    payload: GeneratePlanRequest,
    today: Date,
    rng: &mut impl Rng,
) -> Result<GeneratePlanResponse, ApiError> {
    if payload.plan_date < today {
        return Err(ApiError::Validation(
            "plan date must not be in the past".into(),
        ));
    }
    let profile = profiles::repo::get_profile(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("profile"))?;

    if repo::find_by_owner_and_date(&state.db, user_id, payload.plan_date)
        .await?
        .is_some()
    {
        return Err(ApiError::PlanAlreadyExists(payload.plan_date));
    }

    let catalog = foods::repo::list(&state.db).await?;
    let strategy = payload
        .strategy
        .unwrap_or(state.config.nutrition.default_strategy);
    let targets = strategy.calorie_targets(&profile, today)?;

    let plan = planner::generate(payload.kind, targets.rcde, payload.plan_date, &catalog, rng)?;
    let statistics = planner::statistics(&plan.meals, &catalog, targets.rcde);
    let macro_targets = macros::allocate(targets.rcde, profile.goal, strategy);

    info!(
        user_id = %user_id,
        date = %payload.plan_date,
        kind = ?payload.kind,
        meals = plan.meals.len(),
        "plan proposal generated"
    );
    Ok(GeneratePlanResponse {
        plan,
        macro_targets,
        statistics,
    })
}

/// Plain delete refuses while logged consumption exists for the plan's date;
/// force delete removes the date's logs in the same transaction.
pub async fn delete_plan(
    state: &AppState,
    acting_user: Uuid,
    plan_id: Uuid,
    force: bool,
) -> Result<DeletePlanResponse, ApiError> {
    let plan = repo::find_by_id(&state.db, plan_id)
        .await?
        .ok_or(ApiError::NotFound("plan"))?;
    ensure_can_manage(&plan, acting_user)?;

    let deleted_food_logs = if force {
        let mut tx = state.db.begin().await?;
        let deleted = repo::delete_logs_for_date(&mut tx, plan.owner_id, plan.plan_date).await?;
        repo::delete_plan(&mut tx, plan.id).await?;
        tx.commit().await?;
        deleted
    } else {
        let logs_count = repo::count_logs_for_date(&state.db, plan.owner_id, plan.plan_date).await?;
        if logs_count > 0 {
            return Err(ApiError::Conflict(format!(
                "plan has {logs_count} food log entries for {}; use force delete to remove them",
                plan.plan_date
            )));
        }
        let mut tx = state.db.begin().await?;
        repo::delete_plan(&mut tx, plan.id).await?;
        tx.commit().await?;
        0
    };

    info!(plan_id = %plan.id, force, deleted_food_logs, "plan deleted");
    Ok(DeletePlanResponse {
        message: format!("plan '{}' for {} deleted", plan.name, plan.plan_date),
        deleted_food_logs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::OffsetDateTime;

    fn plan(owner: Uuid, nutritionist: Option<Uuid>) -> NutritionPlan {
        NutritionPlan {
            id: Uuid::new_v4(),
            owner_id: owner,
            nutritionist_id: nutritionist,
            plan_date: date!(2025 - 08 - 20),
            name: "Cut week 1".into(),
            description: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn owner_and_author_can_manage() {
        let owner = Uuid::new_v4();
        let author = Uuid::new_v4();
        let p = plan(owner, Some(author));
        assert!(ensure_can_manage(&p, owner).is_ok());
        assert!(ensure_can_manage(&p, author).is_ok());
    }

    #[test]
    fn stranger_cannot_manage() {
        let p = plan(Uuid::new_v4(), None);
        assert!(matches!(
            ensure_can_manage(&p, Uuid::new_v4()),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn status_line_counts_fulfilled_meals() {
        assert_eq!(status_line(2, 3), "2/3 meals fulfilled");
    }
}
