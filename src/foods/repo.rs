use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Catalog entry. Nutrient columns are rates per one portion unit; a logged
/// consumption contributes rate * portion_size.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub calories_per_portion: f64,
    pub protein_per_portion: f64,
    pub fat_per_portion: f64,
    pub carbs_per_portion: f64,
    pub portion_unit: String,
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Food>> {
    let rows = sqlx::query_as::<_, Food>(
        r#"
        SELECT id, name, description, calories_per_portion, protein_per_portion,
               fat_per_portion, carbs_per_portion, portion_unit
        FROM foods
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Food>> {
    let row = sqlx::query_as::<_, Food>(
        r#"
        SELECT id, name, description, calories_per_portion, protein_per_portion,
               fat_per_portion, carbs_per_portion, portion_unit
        FROM foods
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_by_name(db: &PgPool, name: &str) -> anyhow::Result<Option<Food>> {
    let row = sqlx::query_as::<_, Food>(
        r#"
        SELECT id, name, description, calories_per_portion, protein_per_portion,
               fat_per_portion, carbs_per_portion, portion_unit
        FROM foods
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn create(
    db: &PgPool,
    name: &str,
    description: Option<&str>,
    calories: f64,
    protein: f64,
    fat: f64,
    carbs: f64,
    portion_unit: &str,
) -> anyhow::Result<Food> {
    let row = sqlx::query_as::<_, Food>(
        r#"
        INSERT INTO foods (name, description, calories_per_portion, protein_per_portion,
                           fat_per_portion, carbs_per_portion, portion_unit)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, description, calories_per_portion, protein_per_portion,
                  fat_per_portion, carbs_per_portion, portion_unit
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(calories)
    .bind(protein)
    .bind(fat)
    .bind(carbs)
    .bind(portion_unit)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// How many of the given ids exist. Used to validate plan meals in one query.
pub async fn count_existing(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<i64> {
    let count: i64 =
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM foods WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_one(db)
            .await?;
    Ok(count)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM foods WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
