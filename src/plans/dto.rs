use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo::PlanMeal;
use crate::nutrition::compliance::ComplianceReport;
use crate::nutrition::macros::MacroTargets;
use crate::nutrition::planner::{GeneratedPlan, PlanKind, PlanStatistics};
use crate::nutrition::types::{MealSlot, Strategy};

#[derive(Debug, Deserialize)]
pub struct CreatePlanMealRequest {
    pub food_id: Uuid,
    pub meal_slot: MealSlot,
    pub planned_portion: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    /// Defaults to the acting user; a nutritionist passes their client here.
    pub owner_id: Option<Uuid>,
    pub plan_date: Date,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub meals: Vec<CreatePlanMealRequest>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub nutritionist_id: Option<Uuid>,
    pub plan_date: Date,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub meals: Vec<PlanMeal>,
}

/// Date filters for listing plans: either an exact date or a from/to range.
#[derive(Debug, Default, Deserialize)]
pub struct PlanListQuery {
    pub date: Option<Date>,
    pub from: Option<Date>,
    pub to: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePlanRequest {
    pub plan_date: Date,
    #[serde(default)]
    pub kind: PlanKind,
    pub strategy: Option<Strategy>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePlanResponse {
    pub plan: GeneratedPlan,
    pub macro_targets: MacroTargets,
    pub statistics: PlanStatistics,
}

#[derive(Debug, Serialize)]
pub struct ComplianceStatusResponse {
    pub plan_id: Uuid,
    pub plan_name: String,
    pub plan_date: Date,
    /// Short human summary, e.g. "2/3 meals fulfilled".
    pub status: String,
    #[serde(flatten)]
    pub report: ComplianceReport,
}

#[derive(Debug, Serialize)]
pub struct DeletePlanResponse {
    pub message: String,
    pub deleted_food_logs: u64,
}
