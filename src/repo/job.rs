use crate::core::types::CrawlJob;
use sqlx::types::Json;
use sqlx::SqlitePool;

pub async fn create(
    pool: &SqlitePool,
    job_type: &str,
    parameters: &serde_json::Value,
) -> Result<CrawlJob, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO crawl_jobs (job_type, status, parameters) VALUES (?, 'pending', ?) RETURNING id",
    )
    .bind(job_type)
    .bind(Json(parameters.clone()))
    .fetch_one(pool)
    .await?;

    find(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<CrawlJob>, sqlx::Error> {
    sqlx::query_as::<_, CrawlJob>("SELECT * FROM crawl_jobs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn mark_running(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE crawl_jobs SET status = 'running', started_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE id = ?",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_completed(
    pool: &SqlitePool,
    id: i64,
    result_data: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE crawl_jobs SET status = 'completed', result_data = ?,
             completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE id = ?",
    )
    .bind(Json(result_data.clone()))
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_failed(pool: &SqlitePool, id: i64, error_message: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE crawl_jobs SET status = 'failed', error_message = ?,
             completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE id = ?",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_cancelled(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE crawl_jobs SET status = 'cancelled', completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE id = ?",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
