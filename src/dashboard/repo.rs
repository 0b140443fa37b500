use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

use crate::nutrition::types::MealSlot;

/// One log entry's nutrient contribution, rates multiplied out in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct MealNutrients {
    pub meal_slot: MealSlot,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DayTotal {
    pub log_date: Date,
    pub calories: f64,
}

pub async fn nutrients_for_date(
    db: &PgPool,
    owner_id: Uuid,
    date: Date,
) -> anyhow::Result<Vec<MealNutrients>> {
    let rows = sqlx::query_as::<_, MealNutrients>(
        r#"
        SELECT fl.meal_slot,
               f.calories_per_portion * fl.consumed_portion AS calories,
               f.protein_per_portion * fl.consumed_portion AS protein_g,
               f.carbs_per_portion * fl.consumed_portion AS carbs_g,
               f.fat_per_portion * fl.consumed_portion AS fat_g
        FROM food_logs fl
        JOIN foods f ON f.id = fl.food_id
        WHERE fl.owner_id = $1 AND fl.log_date = $2
        "#,
    )
    .bind(owner_id)
    .bind(date)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Calorie totals per day in the inclusive range, days without logs absent.
pub async fn day_totals(
    db: &PgPool,
    owner_id: Uuid,
    from: Date,
    to: Date,
) -> anyhow::Result<Vec<DayTotal>> {
    let rows = sqlx::query_as::<_, DayTotal>(
        r#"
        SELECT fl.log_date,
               SUM(f.calories_per_portion * fl.consumed_portion) AS calories
        FROM food_logs fl
        JOIN foods f ON f.id = fl.food_id
        WHERE fl.owner_id = $1 AND fl.log_date BETWEEN $2 AND $3
        GROUP BY fl.log_date
        ORDER BY fl.log_date
        "#,
    )
    .bind(owner_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
