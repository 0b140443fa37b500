use serde::Serialize;
use time::Date;

use super::round1;
use super::types::{ActivityLevel, Goal, Profile, Sex, Strategy};
use crate::error::ApiError;

/// Derived calorie values, recomputed on demand from a profile. Never
/// persisted; the profile is the single source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieTargets {
    /// Basal metabolic rate, kcal/day.
    pub bmr: f64,
    /// Total daily energy expenditure, kcal/day.
    pub tdee: f64,
    /// Daily calorie target after the goal adjustment, kcal/day.
    pub rcde: f64,
}

/// Age in whole years as of `today`, civil-calendar rule: the birthday has to
/// have passed this year to count.
pub fn age_on(birth_date: Date, today: Date) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month() as u8, today.day()) < (birth_date.month() as u8, birth_date.day()) {
        age -= 1;
    }
    age
}

impl Strategy {
    /// Basal metabolic rate in kcal/day.
    ///
    /// Standard uses Mifflin-St Jeor; sport uses Katch-McArdle over a lean
    /// mass estimated from a fixed body-fat assumption (male 12%, female 20%).
    pub fn compute_bmr(self, profile: &Profile, today: Date) -> Result<f64, ApiError> {
        if profile.weight_current_kg <= 0.0 || profile.height_cm <= 0.0 {
            return Err(ApiError::Validation(
                "weight and height must be positive to compute metabolic targets".into(),
            ));
        }
        let bmr = match self {
            Self::Standard => {
                let age = f64::from(age_on(profile.birth_date, today));
                let sex_term = match profile.sex {
                    Sex::Male => 5.0,
                    Sex::Female => -161.0,
                };
                10.0 * profile.weight_current_kg + 6.25 * profile.height_cm - 5.0 * age + sex_term
            }
            Self::Sport => {
                let body_fat = match profile.sex {
                    Sex::Male => 0.12,
                    Sex::Female => 0.20,
                };
                let lean_mass_kg = profile.weight_current_kg * (1.0 - body_fat);
                370.0 + 21.6 * lean_mass_kg
            }
        };
        Ok(bmr)
    }

    /// Activity multiplier applied to BMR. The sport table runs hotter across
    /// every level.
    pub fn activity_factor(self, level: ActivityLevel) -> f64 {
        match self {
            Self::Standard => match level {
                ActivityLevel::Sedentary => 1.20,
                ActivityLevel::Light => 1.375,
                ActivityLevel::Moderate => 1.55,
                ActivityLevel::Intense => 1.725,
                ActivityLevel::Extreme => 1.90,
            },
            Self::Sport => match level {
                ActivityLevel::Sedentary => 1.30,
                ActivityLevel::Light => 1.50,
                ActivityLevel::Moderate => 1.70,
                ActivityLevel::Intense => 1.90,
                ActivityLevel::Extreme => 2.20,
            },
        }
    }

    pub fn compute_tdee(self, bmr: f64, level: ActivityLevel) -> f64 {
        bmr * self.activity_factor(level)
    }

    /// Goal adjustment on top of TDEE. Sport keeps a smaller deficit and a
    /// larger surplus to favor muscle preservation.
    pub fn adjust_for_goal(self, tdee: f64, goal: Goal) -> f64 {
        match (self, goal) {
            (_, Goal::Maintain) => tdee,
            (Self::Standard, Goal::Lose) => tdee - 500.0,
            (Self::Standard, Goal::Gain) => tdee + 300.0,
            (Self::Sport, Goal::Lose) => tdee - 300.0,
            (Self::Sport, Goal::Gain) => tdee + 500.0,
        }
    }

    /// Full BMR -> TDEE -> RCDE pipeline, rounded to 0.1 kcal.
    pub fn calorie_targets(self, profile: &Profile, today: Date) -> Result<CalorieTargets, ApiError> {
        let bmr = self.compute_bmr(profile, today)?;
        let tdee = self.compute_tdee(bmr, profile.activity_level);
        let rcde = self.adjust_for_goal(tdee, profile.goal);
        Ok(CalorieTargets {
            bmr: round1(bmr),
            tdee: round1(tdee),
            rcde: round1(rcde),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use uuid::Uuid;

    fn profile(sex: Sex, goal: Goal) -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            sex,
            // 30 years old as of 2025-06-01
            birth_date: date!(1995 - 03 - 14),
            height_cm: 180.0,
            weight_current_kg: 80.0,
            weight_goal_kg: 80.0,
            activity_level: ActivityLevel::Moderate,
            goal,
        }
    }

    const TODAY: Date = date!(2025 - 06 - 01);

    #[test]
    fn age_counts_only_completed_years() {
        assert_eq!(age_on(date!(1995 - 03 - 14), date!(2025 - 06 - 01)), 30);
        assert_eq!(age_on(date!(1995 - 03 - 14), date!(2025 - 03 - 13)), 29);
        assert_eq!(age_on(date!(1995 - 03 - 14), date!(2025 - 03 - 14)), 30);
    }

    #[test]
    fn standard_targets_for_reference_profile() {
        // male, 30y, 80kg, 180cm, moderate, maintain
        let p = profile(Sex::Male, Goal::Maintain);
        let t = Strategy::Standard.calorie_targets(&p, TODAY).unwrap();
        assert!((t.bmr - 1780.0).abs() < 1e-9);
        assert!((t.tdee - 2759.0).abs() < 1e-9);
        assert!((t.rcde - 2759.0).abs() < 1e-9);
    }

    #[test]
    fn standard_female_constant_applies() {
        let p = profile(Sex::Female, Goal::Maintain);
        let bmr = Strategy::Standard.compute_bmr(&p, TODAY).unwrap();
        assert!((bmr - 1614.0).abs() < 1e-9);
    }

    #[test]
    fn sport_bmr_uses_lean_mass() {
        // 80kg male at 12% body fat -> 70.4kg lean mass
        let p = profile(Sex::Male, Goal::Maintain);
        let bmr = Strategy::Sport.compute_bmr(&p, TODAY).unwrap();
        assert!((bmr - (370.0 + 21.6 * 70.4)).abs() < 1e-9);
    }

    #[test]
    fn goal_adjustments_differ_by_strategy() {
        assert!((Strategy::Standard.adjust_for_goal(2000.0, Goal::Lose) - 1500.0).abs() < 1e-9);
        assert!((Strategy::Standard.adjust_for_goal(2000.0, Goal::Gain) - 2300.0).abs() < 1e-9);
        assert!((Strategy::Sport.adjust_for_goal(2000.0, Goal::Lose) - 1700.0).abs() < 1e-9);
        assert!((Strategy::Sport.adjust_for_goal(2000.0, Goal::Gain) - 2500.0).abs() < 1e-9);
    }

    #[test]
    fn targets_are_deterministic() {
        let p = profile(Sex::Female, Goal::Lose);
        let a = Strategy::Sport.calorie_targets(&p, TODAY).unwrap();
        let b = Strategy::Sport.calorie_targets(&p, TODAY).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_positive_measurements_fail_closed() {
        let mut p = profile(Sex::Male, Goal::Maintain);
        p.weight_current_kg = 0.0;
        assert!(Strategy::Standard.compute_bmr(&p, TODAY).is_err());

        let mut p = profile(Sex::Male, Goal::Maintain);
        p.height_cm = -170.0;
        assert!(Strategy::Sport.compute_bmr(&p, TODAY).is_err());
    }
}
