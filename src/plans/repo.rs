use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::compliance::PlannedMeal;
use crate::nutrition::types::MealSlot;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NutritionPlan {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub nutritionist_id: Option<Uuid>,
    pub plan_date: Date,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Plan meal row joined with its food name for responses.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlanMeal {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub meal_slot: MealSlot,
    pub planned_portion: f64,
}

pub async fn find_by_owner_and_date(
    db: &PgPool,
    owner_id: Uuid,
    date: Date,
) -> anyhow::Result<Option<NutritionPlan>> {
    let plan = sqlx::query_as::<_, NutritionPlan>(
        r#"
        SELECT id, owner_id, nutritionist_id, plan_date, name, description, created_at
        FROM nutrition_plans
        WHERE owner_id = $1 AND plan_date = $2
        "#,
    )
    .bind(owner_id)
    .bind(date)
    .fetch_optional(db)
    .await?;
    Ok(plan)
}

/// Same lookup inside a log-submission transaction. The plan row itself is
/// locked so a concurrent force-delete cannot race the validation.
pub async fn find_by_owner_and_date_locked(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    date: Date,
) -> anyhow::Result<Option<NutritionPlan>> {
    let plan = sqlx::query_as::<_, NutritionPlan>(
        r#"
        SELECT id, owner_id, nutritionist_id, plan_date, name, description, created_at
        FROM nutrition_plans
        WHERE owner_id = $1 AND plan_date = $2
        FOR UPDATE
        "#,
    )
    .bind(owner_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(plan)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<NutritionPlan>> {
    let plan = sqlx::query_as::<_, NutritionPlan>(
        r#"
        SELECT id, owner_id, nutritionist_id, plan_date, name, description, created_at
        FROM nutrition_plans
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(plan)
}

pub async fn list_by_owner(
    db: &PgPool,
    owner_id: Uuid,
    date: Option<Date>,
    from: Option<Date>,
    to: Option<Date>,
) -> anyhow::Result<Vec<NutritionPlan>> {
    let plans = if let Some(date) = date {
        sqlx::query_as::<_, NutritionPlan>(
            r#"
            SELECT id, owner_id, nutritionist_id, plan_date, name, description, created_at
            FROM nutrition_plans
            WHERE owner_id = $1 AND plan_date = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(date)
        .fetch_all(db)
        .await?
    } else if let (Some(from), Some(to)) = (from, to) {
        sqlx::query_as::<_, NutritionPlan>(
            r#"
            SELECT id, owner_id, nutritionist_id, plan_date, name, description, created_at
            FROM nutrition_plans
            WHERE owner_id = $1 AND plan_date BETWEEN $2 AND $3
            ORDER BY plan_date
            "#,
        )
        .bind(owner_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?
    } else {
        sqlx::query_as::<_, NutritionPlan>(
            r#"
            SELECT id, owner_id, nutritionist_id, plan_date, name, description, created_at
            FROM nutrition_plans
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await?
    };
    Ok(plans)
}

pub async fn meals_for_plan(db: &PgPool, plan_id: Uuid) -> anyhow::Result<Vec<PlanMeal>> {
    let meals = sqlx::query_as::<_, PlanMeal>(
        r#"
        SELECT pm.id, pm.plan_id, pm.food_id, f.name AS food_name,
               pm.meal_slot, pm.planned_portion
        FROM plan_meals pm
        JOIN foods f ON f.id = pm.food_id
        WHERE pm.plan_id = $1
        ORDER BY pm.meal_slot, f.name
        "#,
    )
    .bind(plan_id)
    .fetch_all(db)
    .await?;
    Ok(meals)
}

/// Rows in the shape the reconciler consumes.
pub async fn planned_meals(db: &PgPool, plan_id: Uuid) -> anyhow::Result<Vec<PlannedMeal>> {
    let meals = sqlx::query_as::<_, PlannedMeal>(
        r#"
        SELECT pm.food_id, f.name AS food_name, pm.meal_slot, pm.planned_portion
        FROM plan_meals pm
        JOIN foods f ON f.id = pm.food_id
        WHERE pm.plan_id = $1
        "#,
    )
    .bind(plan_id)
    .fetch_all(db)
    .await?;
    Ok(meals)
}

/// Reconciler write path: locks the plan's meal rows for the duration of the
/// transaction so two concurrent batches cannot jointly exceed a portion.
pub async fn planned_meals_for_update(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
) -> anyhow::Result<Vec<PlannedMeal>> {
    let meals = sqlx::query_as::<_, PlannedMeal>(
        r#"
        SELECT pm.food_id, f.name AS food_name, pm.meal_slot, pm.planned_portion
        FROM plan_meals pm
        JOIN foods f ON f.id = pm.food_id
        WHERE pm.plan_id = $1
        FOR UPDATE OF pm
        "#,
    )
    .bind(plan_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(meals)
}

pub async fn insert_plan(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    nutritionist_id: Option<Uuid>,
    plan_date: Date,
    name: &str,
    description: Option<&str>,
) -> anyhow::Result<NutritionPlan> {
    let plan = sqlx::query_as::<_, NutritionPlan>(
        r#"
        INSERT INTO nutrition_plans (owner_id, nutritionist_id, plan_date, name, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, owner_id, nutritionist_id, plan_date, name, description, created_at
        "#,
    )
    .bind(owner_id)
    .bind(nutritionist_id)
    .bind(plan_date)
    .bind(name)
    .bind(description)
    .fetch_one(&mut **tx)
    .await?;
    Ok(plan)
}

pub async fn insert_plan_meal(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    food_id: Uuid,
    meal_slot: MealSlot,
    planned_portion: f64,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO plan_meals (plan_id, food_id, meal_slot, planned_portion)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(plan_id)
    .bind(food_id)
    .bind(meal_slot)
    .bind(planned_portion)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Plan meals cascade with the plan row.
pub async fn delete_plan(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM nutrition_plans WHERE id = $1"#)
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_logs_for_date(db: &PgPool, owner_id: Uuid, date: Date) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM food_logs WHERE owner_id = $1 AND log_date = $2"#,
    )
    .bind(owner_id)
    .bind(date)
    .fetch_one(db)
    .await?;
    Ok(count)
}

pub async fn delete_logs_for_date(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    date: Date,
) -> anyhow::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM food_logs WHERE owner_id = $1 AND log_date = $2"#)
        .bind(owner_id)
        .bind(date)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
