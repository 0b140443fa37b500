use time::Date;
use tracing::info;
use uuid::Uuid;

use super::dto::LogEntryRequest;
use super::repo::{self, FoodLogEntry, NewLogEntry};
use crate::error::ApiError;
use crate::nutrition::compliance::{self, AttemptedPortion};
use crate::plans;
use crate::state::AppState;

/// Persist a batch of log entries, all-or-nothing.
///
/// Every entry is validated against its day's plan before anything is
/// written. The whole submission runs in one transaction that locks the plan
/// and its meal rows per affected date, so two concurrent batches for the
/// same (owner, date, food, slot) serialize and cannot jointly exceed the
/// planned portion. Dates are processed in sorted order to keep lock
/// acquisition deterministic.
pub async fn log_batch(
    state: &AppState,
    owner_id: Uuid,
    entries: Vec<LogEntryRequest>,
    today: Date,
) -> Result<Vec<FoodLogEntry>, ApiError> {
    if entries.is_empty() {
        return Err(ApiError::Validation(
            "batch must contain at least one entry".into(),
        ));
    }

    let resolved: Vec<NewLogEntry> = entries
        .iter()
        .map(|e| NewLogEntry {
            food_id: e.food_id,
            meal_slot: e.meal_slot,
            log_date: e.log_date.unwrap_or(today),
            consumed_portion: e.consumed_portion,
        })
        .collect();

    let mut dates: Vec<Date> = resolved.iter().map(|e| e.log_date).collect();
    dates.sort_unstable();
    dates.dedup();

    let mut tx = state.db.begin().await?;

    for date in dates {
        let plan = plans::repo::find_by_owner_and_date_locked(&mut tx, owner_id, date)
            .await?
            .ok_or(ApiError::NoPlanForDate(date))?;
        let meals = plans::repo::planned_meals_for_update(&mut tx, plan.id).await?;
        let already = repo::consumed_portions_tx(&mut tx, owner_id, date).await?;

        let batch: Vec<AttemptedPortion> = resolved
            .iter()
            .filter(|e| e.log_date == date)
            .map(|e| AttemptedPortion {
                food_id: e.food_id,
                meal_slot: e.meal_slot,
                portion: e.consumed_portion,
            })
            .collect();

        compliance::validate_batch(date, &meals, &already, &batch)?;
    }

    let inserted = repo::insert_entries(&mut tx, owner_id, &resolved).await?;
    tx.commit().await?;

    info!(owner_id = %owner_id, entries = inserted.len(), "food log batch recorded");
    Ok(inserted)
}
