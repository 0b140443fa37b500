use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sex", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Intense,
    Extreme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "goal", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

/// Named meal category a planned or logged portion belongs to. The last two
/// slots are only produced by the sport plan generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "meal_slot", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    PreWorkout,
    PostWorkout,
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
            Self::PreWorkout => "pre_workout",
            Self::PostWorkout => "post_workout",
        };
        f.write_str(s)
    }
}

/// Interchangeable calculation strategy for metabolic targets and macro
/// ratios. Selected per request or via `NUTRITION_STRATEGY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Standard,
    Sport,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "sport" => Ok(Self::Sport),
            other => Err(format!("unknown nutrition strategy: {other}")),
        }
    }
}

/// Everything the calculators need to know about a user. Assembled from the
/// users and profiles tables; immutable input to all derived values.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub sex: Sex,
    pub birth_date: Date,
    pub height_cm: f64,
    pub weight_current_kg: f64,
    pub weight_goal_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

impl Profile {
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_current_kg / (height_m * height_m)
    }

    pub fn bmi_category(&self) -> &'static str {
        let bmi = self.bmi();
        if bmi < 18.5 {
            "underweight"
        } else if bmi < 25.0 {
            "normal"
        } else if bmi < 30.0 {
            "overweight"
        } else {
            "obese"
        }
    }

    /// Kilograms between the current and the goal weight, signed.
    pub fn weight_change_needed_kg(&self) -> f64 {
        self.weight_goal_kg - self.weight_current_kg
    }

    /// Rough timeline estimate: a 500 kcal deficit loses ~0.5 kg/week, a
    /// 300 kcal surplus gains ~0.3 kg/week.
    pub fn estimated_weeks_to_goal(&self) -> f64 {
        let change = self.weight_change_needed_kg().abs();
        match self.goal {
            Goal::Lose => change / 0.5,
            Goal::Gain => change / 0.3,
            Goal::Maintain => 0.0,
        }
    }
}
