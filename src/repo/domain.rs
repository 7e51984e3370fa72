use crate::core::types::Domain;
use sqlx::SqlitePool;

pub async fn find_by_name(
    pool: &SqlitePool,
    land_id: i64,
    name: &str,
) -> Result<Option<Domain>, sqlx::Error> {
    sqlx::query_as::<_, Domain>("SELECT * FROM domains WHERE land_id = ? AND name = ?")
        .bind(land_id)
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Idempotent upsert keyed `(name, land_id)` (§5 "Domain upserts must
/// serialize through the engine thread or use `ON CONFLICT`-idempotent
/// inserts").
pub async fn upsert(pool: &SqlitePool, land_id: i64, name: &str) -> Result<Domain, sqlx::Error> {
    sqlx::query(
        "INSERT INTO domains (land_id, name) VALUES (?, ?)
         ON CONFLICT (name, land_id) DO NOTHING",
    )
    .bind(land_id)
    .bind(name)
    .execute(pool)
    .await?;

    find_by_name(pool, land_id, name)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn record_fetch(
    pool: &SqlitePool,
    domain_id: i64,
    title: Option<&str>,
    description: Option<&str>,
    language: Option<&str>,
    http_status: Option<i32>,
    source_tag: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE domains SET title = ?, description = ?, language = ?,
             last_crawled_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
             last_http_status = ?, last_source_tag = ?
         WHERE id = ?",
    )
    .bind(title)
    .bind(description)
    .bind(language)
    .bind(http_status)
    .bind(source_tag)
    .bind(domain_id)
    .execute(pool)
    .await?;
    Ok(())
}
