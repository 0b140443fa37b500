use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::compliance::ConsumedPortions;
use crate::nutrition::types::MealSlot;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FoodLogEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub food_id: Uuid,
    pub log_date: Date,
    pub meal_slot: MealSlot,
    pub consumed_portion: f64,
    pub created_at: OffsetDateTime,
}

/// Log entry joined with its food, nutrient totals already multiplied out.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LogEntryDetail {
    pub id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub log_date: Date,
    pub meal_slot: MealSlot,
    pub consumed_portion: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub created_at: OffsetDateTime,
}

/// A validated entry ready for insertion, effective date already resolved.
#[derive(Debug, Clone, Copy)]
pub struct NewLogEntry {
    pub food_id: Uuid,
    pub meal_slot: MealSlot,
    pub log_date: Date,
    pub consumed_portion: f64,
}

#[derive(Debug, FromRow)]
struct ConsumedRow {
    food_id: Uuid,
    meal_slot: MealSlot,
    total: f64,
}

fn into_map(rows: Vec<ConsumedRow>) -> ConsumedPortions {
    rows.into_iter()
        .map(|r| ((r.food_id, r.meal_slot), r.total))
        .collect()
}

/// Logged portions for one day, summed per (food, slot).
pub async fn consumed_portions(
    db: &PgPool,
    owner_id: Uuid,
    date: Date,
) -> anyhow::Result<ConsumedPortions> {
    let rows = sqlx::query_as::<_, ConsumedRow>(
        r#"
        SELECT food_id, meal_slot, SUM(consumed_portion) AS total
        FROM food_logs
        WHERE owner_id = $1 AND log_date = $2
        GROUP BY food_id, meal_slot
        "#,
    )
    .bind(owner_id)
    .bind(date)
    .fetch_all(db)
    .await?;
    Ok(into_map(rows))
}

/// Same aggregation inside the submission transaction, so the check sees a
/// consistent snapshot under the plan-meal row locks.
pub async fn consumed_portions_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    date: Date,
) -> anyhow::Result<ConsumedPortions> {
    let rows = sqlx::query_as::<_, ConsumedRow>(
        r#"
        SELECT food_id, meal_slot, SUM(consumed_portion) AS total
        FROM food_logs
        WHERE owner_id = $1 AND log_date = $2
        GROUP BY food_id, meal_slot
        "#,
    )
    .bind(owner_id)
    .bind(date)
    .fetch_all(&mut **tx)
    .await?;
    Ok(into_map(rows))
}

pub async fn insert_entries(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    entries: &[NewLogEntry],
) -> anyhow::Result<Vec<FoodLogEntry>> {
    let mut inserted = Vec::with_capacity(entries.len());
    for entry in entries {
        let row = sqlx::query_as::<_, FoodLogEntry>(
            r#"
            INSERT INTO food_logs (owner_id, food_id, log_date, meal_slot, consumed_portion)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, food_id, log_date, meal_slot, consumed_portion, created_at
            "#,
        )
        .bind(owner_id)
        .bind(entry.food_id)
        .bind(entry.log_date)
        .bind(entry.meal_slot)
        .bind(entry.consumed_portion)
        .fetch_one(&mut **tx)
        .await?;
        inserted.push(row);
    }
    Ok(inserted)
}

pub async fn list_for_date(
    db: &PgPool,
    owner_id: Uuid,
    date: Date,
) -> anyhow::Result<Vec<LogEntryDetail>> {
    let rows = sqlx::query_as::<_, LogEntryDetail>(
        r#"
        SELECT fl.id, fl.food_id, f.name AS food_name, fl.log_date, fl.meal_slot,
               fl.consumed_portion,
               f.calories_per_portion * fl.consumed_portion AS calories,
               f.protein_per_portion * fl.consumed_portion AS protein_g,
               f.carbs_per_portion * fl.consumed_portion AS carbs_g,
               f.fat_per_portion * fl.consumed_portion AS fat_g,
               fl.created_at
        FROM food_logs fl
        JOIN foods f ON f.id = fl.food_id
        WHERE fl.owner_id = $1 AND fl.log_date = $2
        ORDER BY fl.created_at
        "#,
    )
    .bind(owner_id)
    .bind(date)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Entries are immutable; the only mutation is deletion by the owner.
pub async fn delete_entry(db: &PgPool, owner_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM food_logs WHERE id = $1 AND owner_id = $2"#)
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
