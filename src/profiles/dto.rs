use serde::{Deserialize, Serialize};

use crate::nutrition::calculator::CalorieTargets;
use crate::nutrition::macros::MacroTargets;
use crate::nutrition::types::{ActivityLevel, Goal, Profile, Strategy};

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub height_cm: f64,
    pub weight_current_kg: f64,
    pub weight_goal_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

/// Optional strategy override, e.g. `GET /profile/metrics?strategy=sport`.
#[derive(Debug, Default, Deserialize)]
pub struct StrategyQuery {
    pub strategy: Option<Strategy>,
}

#[derive(Debug, Serialize)]
pub struct BmiAnalysis {
    pub value: f64,
    pub category: &'static str,
    pub weight_change_needed_kg: f64,
    pub estimated_weeks_to_goal: f64,
}

impl BmiAnalysis {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            value: (profile.bmi() * 10.0).round() / 10.0,
            category: profile.bmi_category(),
            weight_change_needed_kg: (profile.weight_change_needed_kg() * 10.0).round() / 10.0,
            estimated_weeks_to_goal: (profile.estimated_weeks_to_goal() * 10.0).round() / 10.0,
        }
    }
}

/// Everything derived from the profile in one response.
#[derive(Debug, Serialize)]
pub struct ProfileMetrics {
    pub strategy: Strategy,
    pub calorie_targets: CalorieTargets,
    pub macro_targets: MacroTargets,
    pub bmi: BmiAnalysis,
}
