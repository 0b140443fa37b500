use sqlx::PgPool;
use uuid::Uuid;

use crate::nutrition::types::{ActivityLevel, Goal, Profile};

/// Load the full calculator input: body attributes from profiles joined with
/// sex and birth date from users.
pub async fn get_profile(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT p.user_id, u.sex, u.birth_date, p.height_cm, p.weight_current_kg,
               p.weight_goal_kg, p.activity_level, p.goal
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE p.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

pub async fn upsert_profile(
    db: &PgPool,
    user_id: Uuid,
    height_cm: f64,
    weight_current_kg: f64,
    weight_goal_kg: f64,
    activity_level: ActivityLevel,
    goal: Goal,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, height_cm, weight_current_kg, weight_goal_kg,
                              activity_level, goal)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE SET
            height_cm = EXCLUDED.height_cm,
            weight_current_kg = EXCLUDED.weight_current_kg,
            weight_goal_kg = EXCLUDED.weight_goal_kg,
            activity_level = EXCLUDED.activity_level,
            goal = EXCLUDED.goal,
            updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(height_cm)
    .bind(weight_current_kg)
    .bind(weight_goal_kg)
    .bind(activity_level)
    .bind(goal)
    .execute(db)
    .await?;
    Ok(())
}
