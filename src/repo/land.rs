use crate::core::types::Land;
use sqlx::SqlitePool;

pub async fn find(pool: &SqlitePool, land_id: i64) -> Result<Option<Land>, sqlx::Error> {
    sqlx::query_as::<_, Land>("SELECT * FROM lands WHERE id = ?")
        .bind(land_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Land>, sqlx::Error> {
    sqlx::query_as::<_, Land>("SELECT * FROM lands WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
    lang: &[String],
    start_urls: &[String],
) -> Result<Land, sqlx::Error> {
    let lang_json = serde_json::to_string(lang).unwrap_or_else(|_| "[]".to_string());
    let urls_json = serde_json::to_string(start_urls).unwrap_or_else(|_| "[]".to_string());

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO lands (name, description, lang, start_urls) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(description)
    .bind(lang_json)
    .bind(urls_json)
    .fetch_one(pool)
    .await?;

    find(pool, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn all(pool: &SqlitePool) -> Result<Vec<Land>, sqlx::Error> {
    sqlx::query_as::<_, Land>("SELECT * FROM lands ORDER BY id")
        .fetch_all(pool)
        .await
}
