//! Proposed-plan generation. The simple variant splits the calorie target
//! over four slots and picks concrete foods by heuristic classification; the
//! sport variant splits over five slots with display-only focus labels.
//! Food choice among equally eligible candidates is randomized on purpose,
//! so tests assert structure, not exact picks.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::round1;
use super::types::MealSlot;
use crate::error::ApiError;
use crate::foods::repo::Food;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    #[default]
    Simple,
    Sport,
}

/// Calorie budget for one meal slot of a proposed plan.
#[derive(Debug, Clone, Serialize)]
pub struct SlotBudget {
    pub meal_slot: MealSlot,
    pub percentage: f64,
    pub target_calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMeal {
    pub food_id: Uuid,
    pub food_name: String,
    pub meal_slot: MealSlot,
    pub portion_size: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlan {
    pub kind: PlanKind,
    pub name: String,
    pub description: String,
    pub target_calories: f64,
    pub slots: Vec<SlotBudget>,
    pub meals: Vec<GeneratedMeal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanStatistics {
    pub target_calories: f64,
    pub generated_calories: f64,
    pub accuracy_pct: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub meal_count: usize,
}

const SIMPLE_SPLIT: [(MealSlot, f64); 4] = [
    (MealSlot::Breakfast, 0.25),
    (MealSlot::Lunch, 0.35),
    (MealSlot::Dinner, 0.30),
    (MealSlot::Snack, 0.10),
];

const SPORT_SPLIT: [(MealSlot, f64, &str); 5] = [
    (MealSlot::Breakfast, 0.20, "protein and complex carbohydrates"),
    (MealSlot::PreWorkout, 0.15, "fast carbohydrates and light protein"),
    (MealSlot::Lunch, 0.30, "balanced across all macronutrients"),
    (MealSlot::PostWorkout, 0.20, "protein and carbohydrates for recovery"),
    (MealSlot::Dinner, 0.15, "protein, vegetables and healthy fats"),
];

const PROTEIN_KEYWORDS: &[&str] = &["chicken", "egg", "tuna", "salmon", "cheese", "beef", "turkey"];
const CARB_KEYWORDS: &[&str] = &["rice", "oat", "bread", "pasta", "quinoa", "potato"];
const FRUIT_KEYWORDS: &[&str] = &["apple", "banana", "orange", "strawberry", "berry", "pear"];
const VEGETABLE_KEYWORDS: &[&str] = &["broccoli", "spinach", "carrot", "lettuce", "tomato"];
const DAIRY_KEYWORDS: &[&str] = &["yogurt", "milk", "kefir"];
const NUT_KEYWORDS: &[&str] = &["almond", "walnut", "nut"];

const PROTEIN_THRESHOLD_G: f64 = 15.0;
const CARBS_THRESHOLD_G: f64 = 15.0;

fn matches_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| name.contains(k))
}

/// Heuristic classification of the catalog into selection buckets. A food may
/// land in several buckets.
#[derive(Debug, Default)]
pub struct FoodBuckets<'a> {
    pub proteins: Vec<&'a Food>,
    pub carbs: Vec<&'a Food>,
    pub fruits: Vec<&'a Food>,
    pub vegetables: Vec<&'a Food>,
    pub dairy: Vec<&'a Food>,
    pub nuts: Vec<&'a Food>,
}

pub fn classify_foods(foods: &[Food]) -> FoodBuckets<'_> {
    let mut buckets = FoodBuckets::default();
    for food in foods {
        let name = food.name.to_lowercase();
        if matches_any(&name, PROTEIN_KEYWORDS) || food.protein_per_portion > PROTEIN_THRESHOLD_G {
            buckets.proteins.push(food);
        }
        if matches_any(&name, CARB_KEYWORDS) || food.carbs_per_portion > CARBS_THRESHOLD_G {
            buckets.carbs.push(food);
        }
        if matches_any(&name, FRUIT_KEYWORDS) {
            buckets.fruits.push(food);
        }
        if matches_any(&name, VEGETABLE_KEYWORDS) {
            buckets.vegetables.push(food);
        }
        if matches_any(&name, DAIRY_KEYWORDS) {
            buckets.dairy.push(food);
        }
        if matches_any(&name, NUT_KEYWORDS) {
            buckets.nuts.push(food);
        }
    }
    buckets
}

/// Portion that spends `budget_kcal` on the food, capped to keep quantities
/// sensible, rounded to 0.1 portions.
fn portion_for(budget_kcal: f64, food: &Food, cap: f64) -> f64 {
    let kcal = food.calories_per_portion;
    let raw = if kcal > 0.0 { budget_kcal / kcal } else { cap };
    round1(raw.min(cap))
}

/// Vegetables can be nearly calorie-free; the denominator is floored so the
/// cap does the limiting, not a division blow-up.
fn vegetable_portion(budget_kcal: f64, food: &Food, cap: f64) -> f64 {
    round1((budget_kcal / food.calories_per_portion.max(10.0)).min(cap))
}

pub fn generate(
    kind: PlanKind,
    target_calories: f64,
    target_date: Date,
    foods: &[Food],
    rng: &mut impl Rng,
) -> Result<GeneratedPlan, ApiError> {
    if foods.is_empty() {
        return Err(ApiError::NoFoodsAvailable);
    }
    match kind {
        PlanKind::Simple => Ok(generate_simple(target_calories, target_date, foods, rng)),
        PlanKind::Sport => Ok(generate_sport(target_calories, target_date)),
    }
}

fn slot_budgets(
    target_calories: f64,
    split: impl Iterator<Item = (MealSlot, f64, Option<&'static str>)>,
) -> Vec<SlotBudget> {
    split
        .map(|(meal_slot, pct, focus)| SlotBudget {
            meal_slot,
            percentage: pct * 100.0,
            target_calories: round1(target_calories * pct),
            focus,
        })
        .collect()
}

fn generate_simple(
    target_calories: f64,
    target_date: Date,
    foods: &[Food],
    rng: &mut impl Rng,
) -> GeneratedPlan {
    let buckets = classify_foods(foods);
    let mut meals = Vec::new();

    let breakfast_kcal = target_calories * 0.25;
    let lunch_kcal = target_calories * 0.35;
    let dinner_kcal = target_calories * 0.30;
    let snack_kcal = target_calories * 0.10;

    // breakfast: dairy + fruit + a breakfast-leaning carb
    if let Some(food) = buckets.dairy.choose(rng) {
        push_meal(&mut meals, food, MealSlot::Breakfast, portion_for(breakfast_kcal * 0.4, food, 2.0));
    }
    if let Some(food) = buckets.fruits.choose(rng) {
        push_meal(&mut meals, food, MealSlot::Breakfast, portion_for(breakfast_kcal * 0.3, food, 2.0));
    }
    if let Some(food) = choose_preferring(&buckets.carbs, &["oat", "bread"], rng) {
        push_meal(&mut meals, food, MealSlot::Breakfast, portion_for(breakfast_kcal * 0.3, food, 1.5));
    }

    // lunch: protein + a main-dish carb + vegetable
    let lunch_protein = buckets.proteins.choose(rng).copied();
    if let Some(food) = lunch_protein {
        push_meal(&mut meals, food, MealSlot::Lunch, portion_for(lunch_kcal * 0.5, food, 2.0));
    }
    if let Some(food) = choose_preferring(&buckets.carbs, &["rice", "pasta"], rng) {
        push_meal(&mut meals, food, MealSlot::Lunch, portion_for(lunch_kcal * 0.35, food, 2.0));
    }
    let lunch_vegetable = buckets.vegetables.choose(rng).copied();
    if let Some(food) = lunch_vegetable {
        push_meal(&mut meals, food, MealSlot::Lunch, vegetable_portion(lunch_kcal * 0.15, food, 3.0));
    }

    // dinner: protein + vegetable, avoiding the lunch picks for variety
    if let Some(food) = choose_excluding(&buckets.proteins, lunch_protein.map(|f| f.id), rng) {
        push_meal(&mut meals, food, MealSlot::Dinner, portion_for(dinner_kcal * 0.7, food, 2.0));
    }
    if let Some(food) = choose_excluding(&buckets.vegetables, lunch_vegetable.map(|f| f.id), rng) {
        push_meal(&mut meals, food, MealSlot::Dinner, vegetable_portion(dinner_kcal * 0.3, food, 3.0));
    }

    // snack: fruit or nuts
    let snack_options: Vec<&Food> = buckets
        .fruits
        .iter()
        .chain(buckets.nuts.iter())
        .copied()
        .collect();
    if let Some(food) = snack_options.choose(rng) {
        push_meal(&mut meals, food, MealSlot::Snack, portion_for(snack_kcal, food, 1.5));
    }

    GeneratedPlan {
        kind: PlanKind::Simple,
        name: format!("Simple plan - {target_date}"),
        description: format!("Balanced daily plan targeting {target_calories} kcal"),
        target_calories,
        slots: slot_budgets(
            target_calories,
            SIMPLE_SPLIT.iter().map(|&(slot, pct)| (slot, pct, None)),
        ),
        meals,
    }
}

fn generate_sport(target_calories: f64, target_date: Date) -> GeneratedPlan {
    GeneratedPlan {
        kind: PlanKind::Sport,
        name: format!("Sport plan - {target_date}"),
        description: format!(
            "Nutrient-timing plan targeting {target_calories} kcal with pre and post workout meals"
        ),
        target_calories,
        slots: slot_budgets(
            target_calories,
            SPORT_SPLIT
                .iter()
                .map(|&(slot, pct, focus)| (slot, pct, Some(focus))),
        ),
        meals: Vec::new(),
    }
}

fn push_meal(meals: &mut Vec<GeneratedMeal>, food: &Food, meal_slot: MealSlot, portion_size: f64) {
    if portion_size > 0.0 {
        meals.push(GeneratedMeal {
            food_id: food.id,
            food_name: food.name.clone(),
            meal_slot,
            portion_size,
        });
    }
}

/// Prefer candidates whose name matches one of the keywords; fall back to the
/// whole bucket.
fn choose_preferring<'a>(
    bucket: &[&'a Food],
    keywords: &[&str],
    rng: &mut impl Rng,
) -> Option<&'a Food> {
    let preferred: Vec<&Food> = bucket
        .iter()
        .filter(|f| matches_any(&f.name.to_lowercase(), keywords))
        .copied()
        .collect();
    if preferred.is_empty() {
        bucket.choose(rng).copied()
    } else {
        preferred.choose(rng).copied()
    }
}

fn choose_excluding<'a>(
    bucket: &[&'a Food],
    excluded: Option<Uuid>,
    rng: &mut impl Rng,
) -> Option<&'a Food> {
    let remaining: Vec<&Food> = bucket
        .iter()
        .filter(|f| Some(f.id) != excluded)
        .copied()
        .collect();
    if remaining.is_empty() {
        bucket.choose(rng).copied()
    } else {
        remaining.choose(rng).copied()
    }
}

pub fn statistics(
    meals: &[GeneratedMeal],
    foods: &[Food],
    target_calories: f64,
) -> PlanStatistics {
    let mut calories = 0.0;
    let mut protein = 0.0;
    let mut carbs = 0.0;
    let mut fat = 0.0;
    for meal in meals {
        if let Some(food) = foods.iter().find(|f| f.id == meal.food_id) {
            calories += food.calories_per_portion * meal.portion_size;
            protein += food.protein_per_portion * meal.portion_size;
            carbs += food.carbs_per_portion * meal.portion_size;
            fat += food.fat_per_portion * meal.portion_size;
        }
    }
    let accuracy_pct = if target_calories > 0.0 {
        round1(calories / target_calories * 100.0)
    } else {
        0.0
    };
    PlanStatistics {
        target_calories: round1(target_calories),
        generated_calories: round1(calories),
        accuracy_pct,
        protein_g: round1(protein),
        carbs_g: round1(carbs),
        fat_g: round1(fat),
        meal_count: meals.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use time::macros::date;

    fn food(name: &str, kcal: f64, protein: f64, carbs: f64, fat: f64) -> Food {
        Food {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            calories_per_portion: kcal,
            protein_per_portion: protein,
            fat_per_portion: fat,
            carbs_per_portion: carbs,
            portion_unit: "portion".into(),
        }
    }

    fn catalog() -> Vec<Food> {
        vec![
            food("greek yogurt", 120.0, 10.0, 8.0, 4.0),
            food("banana", 90.0, 1.0, 23.0, 0.3),
            food("oatmeal", 150.0, 5.0, 27.0, 3.0),
            food("chicken breast", 165.0, 31.0, 0.0, 3.6),
            food("salmon fillet", 200.0, 22.0, 0.0, 12.0),
            food("white rice", 130.0, 2.7, 28.0, 0.3),
            food("broccoli", 35.0, 2.8, 7.0, 0.4),
            food("spinach", 23.0, 2.9, 3.6, 0.4),
            food("almonds", 170.0, 6.0, 6.0, 15.0),
        ]
    }

    const DATE: Date = date!(2025 - 07 - 01);

    #[test]
    fn empty_catalog_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate(PlanKind::Simple, 2000.0, DATE, &[], &mut rng).unwrap_err();
        assert!(matches!(err, ApiError::NoFoodsAvailable));
    }

    #[test]
    fn simple_slot_split_reproduces_target() {
        let mut rng = StdRng::seed_from_u64(2);
        let plan = generate(PlanKind::Simple, 2759.0, DATE, &catalog(), &mut rng).unwrap();
        let sum: f64 = plan.slots.iter().map(|s| s.target_calories).sum();
        assert!((sum - 2759.0).abs() <= 0.1 * plan.slots.len() as f64);
        let pct: f64 = plan.slots.iter().map(|s| s.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn simple_breakfast_has_dairy_or_fruit_when_available() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let catalog = catalog();
            let plan = generate(PlanKind::Simple, 2200.0, DATE, &catalog, &mut rng).unwrap();
            let breakfast: Vec<_> = plan
                .meals
                .iter()
                .filter(|m| m.meal_slot == MealSlot::Breakfast)
                .collect();
            assert!(!breakfast.is_empty());
            assert!(breakfast
                .iter()
                .any(|m| ["greek yogurt", "banana"].contains(&m.food_name.as_str())));
        }
    }

    #[test]
    fn simple_portions_stay_positive_and_capped() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = generate(PlanKind::Simple, 3200.0, DATE, &catalog(), &mut rng).unwrap();
            for meal in &plan.meals {
                assert!(meal.portion_size > 0.0, "{meal:?}");
                assert!(meal.portion_size <= 3.0, "{meal:?}");
            }
        }
    }

    #[test]
    fn simple_dinner_protein_differs_from_lunch_when_possible() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = generate(PlanKind::Simple, 2500.0, DATE, &catalog(), &mut rng).unwrap();
            let pick = |slot: MealSlot| {
                plan.meals
                    .iter()
                    .find(|m| {
                        m.meal_slot == slot
                            && ["chicken breast", "salmon fillet"].contains(&m.food_name.as_str())
                    })
                    .map(|m| m.food_id)
            };
            if let (Some(lunch), Some(dinner)) = (pick(MealSlot::Lunch), pick(MealSlot::Dinner)) {
                assert_ne!(lunch, dinner);
            }
        }
    }

    #[test]
    fn sport_plan_has_five_focused_slots_and_no_foods() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = generate(PlanKind::Sport, 3000.0, DATE, &catalog(), &mut rng).unwrap();
        assert_eq!(plan.slots.len(), 5);
        assert!(plan.slots.iter().all(|s| s.focus.is_some()));
        assert!(plan.meals.is_empty());
        let sum: f64 = plan.slots.iter().map(|s| s.target_calories).sum();
        assert!((sum - 3000.0).abs() <= 0.1 * plan.slots.len() as f64);
        assert_eq!(plan.slots[1].meal_slot, MealSlot::PreWorkout);
        assert_eq!(plan.slots[3].meal_slot, MealSlot::PostWorkout);
    }

    #[test]
    fn statistics_reflect_generated_meals() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(4);
        let plan = generate(PlanKind::Simple, 2400.0, DATE, &catalog, &mut rng).unwrap();
        let stats = statistics(&plan.meals, &catalog, 2400.0);
        assert_eq!(stats.meal_count, plan.meals.len());
        assert!(stats.generated_calories > 0.0);
        let expected: f64 = plan
            .meals
            .iter()
            .map(|m| {
                catalog
                    .iter()
                    .find(|f| f.id == m.food_id)
                    .map(|f| f.calories_per_portion * m.portion_size)
                    .unwrap_or(0.0)
            })
            .sum();
        assert!((stats.generated_calories - round1(expected)).abs() < 1e-9);
    }
}
