//! Read-side aggregation for the dashboard. All functions are pure over rows
//! the repo fetched, with "today" passed in explicitly.

use std::collections::HashMap;

use time::{Date, Duration};

use super::dto::{
    CaloricCompliance, CaloricStatus, DaySeriesPoint, TodayConsumption, WeeklyAdherence,
};
use super::repo::{DayTotal, MealNutrients};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Monday of the week `today` falls in.
pub fn week_start(today: Date) -> Date {
    today - Duration::days(i64::from(today.weekday().number_days_from_monday()))
}

pub fn summarize_today(rows: &[MealNutrients]) -> TodayConsumption {
    let mut total_calories = 0.0;
    let mut total_protein_g = 0.0;
    let mut total_carbs_g = 0.0;
    let mut total_fat_g = 0.0;
    let mut by_meal: HashMap<_, f64> = HashMap::new();

    for row in rows {
        total_calories += row.calories;
        total_protein_g += row.protein_g;
        total_carbs_g += row.carbs_g;
        total_fat_g += row.fat_g;
        *by_meal.entry(row.meal_slot).or_default() += row.calories;
    }

    TodayConsumption {
        total_calories: round1(total_calories),
        total_protein_g: round1(total_protein_g),
        total_carbs_g: round1(total_carbs_g),
        total_fat_g: round1(total_fat_g),
        by_meal: by_meal.into_iter().map(|(k, v)| (k, round1(v))).collect(),
    }
}

/// 90-110% of the daily target is optimal. A non-positive target cannot be
/// divided by and reads as nothing consumed toward it.
pub fn caloric_compliance(consumed_calories: f64, rcde: f64) -> CaloricCompliance {
    let percentage = if rcde > 0.0 {
        round1(consumed_calories / rcde * 100.0)
    } else {
        0.0
    };
    let status = if percentage < 90.0 {
        CaloricStatus::Low
    } else if percentage > 110.0 {
        CaloricStatus::High
    } else {
        CaloricStatus::Optimal
    };
    CaloricCompliance {
        target_calories: round1(rcde),
        consumed_calories: round1(consumed_calories),
        difference: round1(consumed_calories - rcde),
        percentage,
        status,
    }
}

/// Days with at least one log over days elapsed since Monday, inclusive.
pub fn weekly_adherence(days_with_logs: usize, days_elapsed: usize) -> WeeklyAdherence {
    let adherence_percentage = if days_elapsed > 0 {
        round1(days_with_logs as f64 / days_elapsed as f64 * 100.0)
    } else {
        0.0
    };
    WeeklyAdherence {
        days_with_logs,
        days_elapsed,
        adherence_percentage,
    }
}

/// Seven-day calorie series ending today, oldest first. Days without logs
/// appear with zero calories.
pub fn week_series(day_totals: &[DayTotal], today: Date, rcde: f64) -> Vec<DaySeriesPoint> {
    let totals: HashMap<Date, f64> = day_totals
        .iter()
        .map(|d| (d.log_date, d.calories))
        .collect();

    (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let total_calories = totals.get(&date).copied().unwrap_or(0.0);
            let compliance_pct = if rcde > 0.0 {
                round1(total_calories / rcde * 100.0)
            } else {
                0.0
            };
            DaySeriesPoint {
                date,
                day_name: date.weekday().to_string(),
                total_calories: round1(total_calories),
                target: round1(rcde),
                compliance_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::types::MealSlot;
    use time::macros::date;

    fn row(slot: MealSlot, calories: f64) -> MealNutrients {
        MealNutrients {
            meal_slot: slot,
            calories,
            protein_g: calories * 0.1,
            carbs_g: calories * 0.12,
            fat_g: calories * 0.04,
        }
    }

    #[test]
    fn today_summary_groups_by_meal_slot() {
        let rows = vec![
            row(MealSlot::Breakfast, 300.0),
            row(MealSlot::Breakfast, 150.0),
            row(MealSlot::Lunch, 700.0),
        ];
        let summary = summarize_today(&rows);
        assert!((summary.total_calories - 1150.0).abs() < 1e-9);
        assert!((summary.by_meal[&MealSlot::Breakfast] - 450.0).abs() < 1e-9);
        assert!((summary.by_meal[&MealSlot::Lunch] - 700.0).abs() < 1e-9);
        assert!(!summary.by_meal.contains_key(&MealSlot::Dinner));
    }

    #[test]
    fn caloric_status_boundaries() {
        assert_eq!(caloric_compliance(1800.0, 2000.0).status, CaloricStatus::Optimal); // 90%
        assert_eq!(caloric_compliance(2200.0, 2000.0).status, CaloricStatus::Optimal); // 110%
        assert_eq!(caloric_compliance(1799.0, 2000.0).status, CaloricStatus::Low);
        assert_eq!(caloric_compliance(2221.0, 2000.0).status, CaloricStatus::High);
    }

    #[test]
    fn caloric_compliance_guards_zero_target() {
        let c = caloric_compliance(1500.0, 0.0);
        assert!((c.percentage - 0.0).abs() < 1e-9);
        assert_eq!(c.status, CaloricStatus::Low);
    }

    #[test]
    fn weekly_adherence_is_days_ratio() {
        let a = weekly_adherence(3, 4);
        assert!((a.adherence_percentage - 75.0).abs() < 1e-9);
        let empty = weekly_adherence(0, 0);
        assert!((empty.adherence_percentage - 0.0).abs() < 1e-9);
    }

    #[test]
    fn week_start_is_monday() {
        // 2025-06-05 is a Thursday
        assert_eq!(week_start(date!(2025 - 06 - 05)), date!(2025 - 06 - 02));
        // Monday maps to itself
        assert_eq!(week_start(date!(2025 - 06 - 02)), date!(2025 - 06 - 02));
    }

    #[test]
    fn week_series_is_oldest_first_with_gaps_as_zero() {
        let today = date!(2025 - 06 - 05);
        let totals = vec![
            DayTotal {
                log_date: date!(2025 - 06 - 04),
                calories: 1900.0,
            },
            DayTotal {
                log_date: date!(2025 - 06 - 05),
                calories: 2100.0,
            },
        ];
        let series = week_series(&totals, today, 2000.0);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, date!(2025 - 05 - 30));
        assert_eq!(series[6].date, today);
        assert_eq!(series[6].day_name, "Thursday");
        assert!((series[5].total_calories - 1900.0).abs() < 1e-9);
        assert!((series[0].total_calories - 0.0).abs() < 1e-9);
        assert!((series[6].compliance_pct - 105.0).abs() < 1e-9);
    }
}
