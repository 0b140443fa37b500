use std::collections::HashMap;

use serde::Serialize;
use time::Date;

use crate::nutrition::calculator::CalorieTargets;
use crate::nutrition::macros::MacroTargets;
use crate::nutrition::types::{ActivityLevel, Goal, MealSlot};
use crate::profiles::dto::BmiAnalysis;

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub name: String,
    pub age: i32,
    pub height_cm: f64,
    pub weight_current_kg: f64,
    pub weight_goal_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TodayConsumption {
    pub total_calories: f64,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub by_meal: HashMap<MealSlot, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaloricStatus {
    Optimal,
    Low,
    High,
}

#[derive(Debug, Serialize)]
pub struct CaloricCompliance {
    pub target_calories: f64,
    pub consumed_calories: f64,
    pub difference: f64,
    pub percentage: f64,
    pub status: CaloricStatus,
}

#[derive(Debug, Serialize)]
pub struct WeeklyAdherence {
    pub days_with_logs: usize,
    pub days_elapsed: usize,
    pub adherence_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct DaySeriesPoint {
    pub date: Date,
    pub day_name: String,
    pub total_calories: f64,
    pub target: f64,
    pub compliance_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: UserInfo,
    pub calorie_targets: CalorieTargets,
    pub macro_targets: MacroTargets,
    pub bmi: BmiAnalysis,
    pub today_consumption: TodayConsumption,
    pub caloric_compliance: CaloricCompliance,
    pub weekly_adherence: WeeklyAdherence,
    /// Last seven days ending today, oldest first.
    pub week_daily_consumption: Vec<DaySeriesPoint>,
}
