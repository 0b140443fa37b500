//! Plan-compliance reconciliation. Plans and log entries are linked only by
//! the (owner, date, food, meal slot) tuple, so both the read side and the
//! write side re-aggregate logged portions on every call instead of keeping a
//! cached relation; logs can outlive the plan they were checked against.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

use super::round1;
use super::types::MealSlot;
use crate::error::ApiError;

/// Slack applied when comparing summed portions against the plan, so float
/// accumulation cannot reject an exact fill.
pub const PORTION_EPSILON: f64 = 0.001;

/// Terminal state of one planned meal for a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    Fulfilled,
    Partial,
    Pending,
}

/// 80-120% of the planned portion counts as fulfilled. Anything above 120%
/// stays partial; there is no separate over-consumption state.
pub fn classify(compliance_pct: f64) -> MealStatus {
    if compliance_pct == 0.0 {
        MealStatus::Pending
    } else if (80.0..=120.0).contains(&compliance_pct) {
        MealStatus::Fulfilled
    } else {
        MealStatus::Partial
    }
}

/// One plan meal row joined with its food name, as the reconciler consumes it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlannedMeal {
    pub food_id: Uuid,
    pub food_name: String,
    pub meal_slot: MealSlot,
    pub planned_portion: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealCompliance {
    pub food_id: Uuid,
    pub food_name: String,
    pub meal_slot: MealSlot,
    pub planned_portion: f64,
    pub consumed_portion: f64,
    pub compliance_pct: f64,
    pub fulfilled: bool,
    pub status: MealStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub total_planned: usize,
    pub fulfilled_count: usize,
    /// Arithmetic mean of the per-meal compliance percentages. Deliberately
    /// NOT a consumed/planned calorie ratio: every planned meal weighs the
    /// same regardless of its size.
    pub adherence_percentage: f64,
    pub detail: Vec<MealCompliance>,
}

/// Aggregated portions already logged, keyed by (food, slot).
pub type ConsumedPortions = HashMap<(Uuid, MealSlot), f64>;

/// Read-side reconciliation of one plan against one day's logs.
pub fn reconcile(meals: &[PlannedMeal], consumed: &ConsumedPortions) -> ComplianceReport {
    let mut detail = Vec::with_capacity(meals.len());
    let mut fulfilled_count = 0;
    let mut pct_sum = 0.0;
    let mut counted = 0usize;

    for meal in meals {
        let consumed_portion = consumed
            .get(&(meal.food_id, meal.meal_slot))
            .copied()
            .unwrap_or(0.0);
        let pct = if meal.planned_portion > 0.0 {
            consumed_portion / meal.planned_portion * 100.0
        } else {
            // unreachable through the API; reported as pending, excluded
            // from the adherence mean
            0.0
        };
        let status = classify(pct);
        if status == MealStatus::Fulfilled {
            fulfilled_count += 1;
        }
        if meal.planned_portion > 0.0 {
            pct_sum += pct;
            counted += 1;
        }
        detail.push(MealCompliance {
            food_id: meal.food_id,
            food_name: meal.food_name.clone(),
            meal_slot: meal.meal_slot,
            planned_portion: meal.planned_portion,
            consumed_portion,
            compliance_pct: round1(pct),
            fulfilled: status == MealStatus::Fulfilled,
            status,
        });
    }

    let adherence_percentage = if counted > 0 {
        round1(pct_sum / counted as f64)
    } else {
        0.0
    };

    ComplianceReport {
        total_planned: meals.len(),
        fulfilled_count,
        adherence_percentage,
        detail,
    }
}

/// One entry of a log submission, after the effective date is resolved.
#[derive(Debug, Clone, Copy)]
pub struct AttemptedPortion {
    pub food_id: Uuid,
    pub meal_slot: MealSlot,
    pub portion: f64,
}

/// Write-side gate for a batch of log entries against one day's plan.
///
/// The whole batch is validated before anything is persisted: portions for
/// the same (food, slot) are summed across the batch and checked together
/// with what is already logged, so a batch cannot sneak past the cap by
/// splitting itself. Any failure rejects the batch as a whole.
pub fn validate_batch(
    date: Date,
    meals: &[PlannedMeal],
    already: &ConsumedPortions,
    batch: &[AttemptedPortion],
) -> Result<(), ApiError> {
    let mut attempted: HashMap<(Uuid, MealSlot), f64> = HashMap::new();
    for entry in batch {
        if entry.portion <= 0.0 {
            return Err(ApiError::Validation(
                "consumed portion must be positive".into(),
            ));
        }
        *attempted.entry((entry.food_id, entry.meal_slot)).or_default() += entry.portion;
    }

    for ((food_id, meal_slot), total) in attempted {
        let planned = meals
            .iter()
            .find(|m| m.food_id == food_id && m.meal_slot == meal_slot)
            .map(|m| m.planned_portion)
            .filter(|p| *p > 0.0)
            .ok_or(ApiError::MealNotPlanned {
                food_id,
                meal_slot,
                date,
            })?;
        let consumed = already.get(&(food_id, meal_slot)).copied().unwrap_or(0.0);
        if consumed + total > planned + PORTION_EPSILON {
            return Err(ApiError::PortionExceedsPlan {
                food_id,
                meal_slot,
                planned,
                consumed,
                remaining: (planned - consumed).max(0.0),
                attempted: total,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(food_id: Uuid, slot: MealSlot, planned: f64) -> PlannedMeal {
        PlannedMeal {
            food_id,
            food_name: "oatmeal".into(),
            meal_slot: slot,
            planned_portion: planned,
        }
    }

    #[test]
    fn classification_boundaries_are_inclusive() {
        assert_eq!(classify(80.0), MealStatus::Fulfilled);
        assert_eq!(classify(120.0), MealStatus::Fulfilled);
        assert_eq!(classify(79.999), MealStatus::Partial);
        assert_eq!(classify(120.001), MealStatus::Partial);
        assert_eq!(classify(250.0), MealStatus::Partial);
        assert_eq!(classify(0.0), MealStatus::Pending);
    }

    #[test]
    fn compliance_pct_is_exact_ratio() {
        let food = Uuid::new_v4();
        let meals = vec![meal(food, MealSlot::Lunch, 2.0)];
        let mut consumed = ConsumedPortions::new();
        consumed.insert((food, MealSlot::Lunch), 1.5);

        let report = reconcile(&meals, &consumed);
        assert!((report.detail[0].compliance_pct - 75.0).abs() < 1e-9);
        assert_eq!(report.detail[0].status, MealStatus::Partial);
    }

    #[test]
    fn adherence_is_mean_of_percentages_not_calorie_weighted() {
        // two meals fully consumed, one untouched -> (100 + 100 + 0) / 3
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let meals = vec![
            meal(a, MealSlot::Breakfast, 1.0),
            meal(b, MealSlot::Lunch, 4.0),
            meal(c, MealSlot::Dinner, 2.0),
        ];
        let mut consumed = ConsumedPortions::new();
        consumed.insert((a, MealSlot::Breakfast), 1.0);
        consumed.insert((b, MealSlot::Lunch), 4.0);

        let report = reconcile(&meals, &consumed);
        assert_eq!(report.total_planned, 3);
        assert_eq!(report.fulfilled_count, 2);
        assert!((report.adherence_percentage - 66.7).abs() < 1e-9);
    }

    #[test]
    fn aggregates_multiple_logs_per_slot() {
        let food = Uuid::new_v4();
        let meals = vec![meal(food, MealSlot::Breakfast, 2.0)];
        let mut consumed = ConsumedPortions::new();
        // two separate log entries summed upstream
        consumed.insert((food, MealSlot::Breakfast), 0.9 + 1.1);

        let report = reconcile(&meals, &consumed);
        assert!((report.detail[0].compliance_pct - 100.0).abs() < 1e-9);
        assert_eq!(report.fulfilled_count, 1);
    }

    #[test]
    fn batch_exceeding_remaining_portion_is_rejected_with_detail() {
        // planned 2.0, already logged 1.0, attempting 1.5
        let food = Uuid::new_v4();
        let date = time::macros::date!(2025 - 06 - 03);
        let meals = vec![meal(food, MealSlot::Breakfast, 2.0)];
        let mut already = ConsumedPortions::new();
        already.insert((food, MealSlot::Breakfast), 1.0);
        let batch = [AttemptedPortion {
            food_id: food,
            meal_slot: MealSlot::Breakfast,
            portion: 1.5,
        }];

        let err = validate_batch(date, &meals, &already, &batch).unwrap_err();
        match err {
            ApiError::PortionExceedsPlan {
                planned,
                consumed,
                remaining,
                attempted,
                ..
            } => {
                assert!((planned - 2.0).abs() < 1e-9);
                assert!((consumed - 1.0).abs() < 1e-9);
                assert!((remaining - 1.0).abs() < 1e-9);
                assert!((attempted - 1.5).abs() < 1e-9);
            }
            other => panic!("expected PortionExceedsPlan, got {other:?}"),
        }
    }

    #[test]
    fn batch_sums_its_own_entries_before_checking() {
        let food = Uuid::new_v4();
        let date = time::macros::date!(2025 - 06 - 03);
        let meals = vec![meal(food, MealSlot::Dinner, 2.0)];
        let already = ConsumedPortions::new();
        // individually fine, jointly over the cap
        let batch = [
            AttemptedPortion {
                food_id: food,
                meal_slot: MealSlot::Dinner,
                portion: 1.2,
            },
            AttemptedPortion {
                food_id: food,
                meal_slot: MealSlot::Dinner,
                portion: 1.2,
            },
        ];

        assert!(matches!(
            validate_batch(date, &meals, &already, &batch),
            Err(ApiError::PortionExceedsPlan { .. })
        ));
    }

    #[test]
    fn exact_fill_passes_within_epsilon() {
        let food = Uuid::new_v4();
        let date = time::macros::date!(2025 - 06 - 03);
        let meals = vec![meal(food, MealSlot::Lunch, 3.0)];
        let mut already = ConsumedPortions::new();
        already.insert((food, MealSlot::Lunch), 1.0);
        let batch = [AttemptedPortion {
            food_id: food,
            meal_slot: MealSlot::Lunch,
            portion: 2.0,
        }];

        assert!(validate_batch(date, &meals, &already, &batch).is_ok());
    }

    #[test]
    fn unplanned_food_or_slot_is_rejected() {
        let date = time::macros::date!(2025 - 06 - 03);
        let meals = vec![meal(Uuid::new_v4(), MealSlot::Lunch, 2.0)];
        let batch = [AttemptedPortion {
            food_id: Uuid::new_v4(),
            meal_slot: MealSlot::Lunch,
            portion: 0.5,
        }];

        assert!(matches!(
            validate_batch(date, &meals, &ConsumedPortions::new(), &batch),
            Err(ApiError::MealNotPlanned { .. })
        ));
    }

    #[test]
    fn non_positive_portion_is_a_validation_error() {
        let date = time::macros::date!(2025 - 06 - 03);
        let food = Uuid::new_v4();
        let meals = vec![meal(food, MealSlot::Snack, 1.0)];
        let batch = [AttemptedPortion {
            food_id: food,
            meal_slot: MealSlot::Snack,
            portion: 0.0,
        }];

        assert!(matches!(
            validate_batch(date, &meals, &ConsumedPortions::new(), &batch),
            Err(ApiError::Validation(_))
        ));
    }
}
