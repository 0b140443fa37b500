use serde::Serialize;

use super::round1;
use super::types::{Goal, Strategy};

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// Gram and kcal targets per macronutrient, derived from the daily calorie
/// target. Pure function of (rcde, goal, strategy).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroTargets {
    pub protein_kcal: f64,
    pub protein_g: f64,
    pub carbs_kcal: f64,
    pub carbs_g: f64,
    pub fat_kcal: f64,
    pub fat_g: f64,
}

/// (protein, carbs, fat) calorie shares. Each row sums to 1.0.
pub fn ratios(strategy: Strategy, goal: Goal) -> (f64, f64, f64) {
    match (strategy, goal) {
        (Strategy::Standard, Goal::Gain) => (0.25, 0.45, 0.30),
        (Strategy::Standard, Goal::Lose) => (0.30, 0.40, 0.30),
        (Strategy::Standard, Goal::Maintain) => (0.20, 0.50, 0.30),
        (Strategy::Sport, Goal::Gain) => (0.30, 0.45, 0.25),
        (Strategy::Sport, Goal::Lose) => (0.35, 0.35, 0.30),
        (Strategy::Sport, Goal::Maintain) => (0.25, 0.50, 0.25),
    }
}

pub fn allocate(rcde: f64, goal: Goal, strategy: Strategy) -> MacroTargets {
    let (protein, carbs, fat) = ratios(strategy, goal);
    MacroTargets {
        protein_kcal: round1(rcde * protein),
        protein_g: round1(rcde * protein / KCAL_PER_G_PROTEIN),
        carbs_kcal: round1(rcde * carbs),
        carbs_g: round1(rcde * carbs / KCAL_PER_G_CARBS),
        fat_kcal: round1(rcde * fat),
        fat_g: round1(rcde * fat / KCAL_PER_G_FAT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [(Strategy, Goal); 6] = [
        (Strategy::Standard, Goal::Gain),
        (Strategy::Standard, Goal::Lose),
        (Strategy::Standard, Goal::Maintain),
        (Strategy::Sport, Goal::Gain),
        (Strategy::Sport, Goal::Lose),
        (Strategy::Sport, Goal::Maintain),
    ];

    #[test]
    fn every_ratio_row_sums_to_one() {
        for (strategy, goal) in ALL {
            let (p, c, f) = ratios(strategy, goal);
            assert!(
                ((p + c + f) - 1.0).abs() < 1e-9,
                "{strategy:?}/{goal:?} ratios do not sum to 1.0"
            );
        }
    }

    #[test]
    fn grams_follow_kcal_densities() {
        let t = allocate(2000.0, Goal::Maintain, Strategy::Standard);
        assert!((t.protein_kcal - 400.0).abs() < 1e-9);
        assert!((t.protein_g - 100.0).abs() < 1e-9);
        assert!((t.carbs_kcal - 1000.0).abs() < 1e-9);
        assert!((t.carbs_g - 250.0).abs() < 1e-9);
        assert!((t.fat_kcal - 600.0).abs() < 1e-9);
        assert!((t.fat_g - 66.7).abs() < 1e-9);
    }

    #[test]
    fn allocation_is_idempotent() {
        for (strategy, goal) in ALL {
            let a = allocate(2431.7, goal, strategy);
            let b = allocate(2431.7, goal, strategy);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn sport_lose_pushes_protein_over_carbs() {
        let t = allocate(2000.0, Goal::Lose, Strategy::Sport);
        assert_eq!(t.protein_kcal, t.carbs_kcal);
        assert!(t.protein_kcal > t.fat_kcal);
    }
}
