use crate::core::types::Expression;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Expression>, sqlx::Error> {
    sqlx::query_as::<_, Expression>("SELECT * FROM expressions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_url_hash(
    pool: &SqlitePool,
    land_id: i64,
    url_hash: &str,
) -> Result<Option<Expression>, sqlx::Error> {
    sqlx::query_as::<_, Expression>(
        "SELECT * FROM expressions WHERE land_id = ? AND url_hash = ?",
    )
    .bind(land_id)
    .bind(url_hash)
    .fetch_optional(pool)
    .await
}

/// Insert a newly discovered URL at `depth`; no-op (returns the existing
/// row) if `(land_id, url_hash)` already exists (§4.7/§4.8 discovery).
pub async fn create_if_absent(
    pool: &SqlitePool,
    land_id: i64,
    domain_id: i64,
    url: &str,
    url_hash: &str,
    depth: i64,
) -> Result<Expression, sqlx::Error> {
    if let Some(existing) = find_by_url_hash(pool, land_id, url_hash).await? {
        return Ok(existing);
    }

    sqlx::query(
        "INSERT INTO expressions (land_id, domain_id, url, url_hash, depth) VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (land_id, url_hash) DO NOTHING",
    )
    .bind(land_id)
    .bind(domain_id)
    .bind(url)
    .bind(url_hash)
    .bind(depth)
    .execute(pool)
    .await?;

    find_by_url_hash(pool, land_id, url_hash)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// The Crawl Engine's selection query (§4.8 "select"): un-approved
/// expressions, oldest/shallowest first, up to `limit`.
pub async fn select_pending(
    pool: &SqlitePool,
    land_id: i64,
    limit: i64,
) -> Result<Vec<Expression>, sqlx::Error> {
    select_pending_filtered(pool, land_id, limit, None, None).await
}

/// Same selection as [`select_pending`], optionally narrowed to a single
/// `depth` and/or a single `http_status` (§4.8 "select ... filtered
/// optionally by depth and http_status").
pub async fn select_pending_filtered(
    pool: &SqlitePool,
    land_id: i64,
    limit: i64,
    depth_filter: Option<i64>,
    http_status_filter: Option<i32>,
) -> Result<Vec<Expression>, sqlx::Error> {
    sqlx::query_as::<_, Expression>(
        "SELECT * FROM expressions
         WHERE land_id = ? AND approved_at IS NULL
           AND (? IS NULL OR depth = ?)
           AND (? IS NULL OR http_status = ?)
         ORDER BY depth ASC, created_at ASC
         LIMIT ?",
    )
    .bind(land_id)
    .bind(depth_filter)
    .bind(depth_filter)
    .bind(http_status_filter)
    .bind(http_status_filter)
    .bind(limit)
    .fetch_all(pool)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn record_fetch(
    pool: &SqlitePool,
    id: i64,
    http_status: Option<i32>,
    content_type: Option<&str>,
    content_length: Option<i64>,
    title: Option<&str>,
    description: Option<&str>,
    keywords: Option<&str>,
    canonical_url: Option<&str>,
    language: Option<&str>,
    content: Option<&str>,
    readable: Option<&str>,
    source_tag: Option<&str>,
    word_count: Option<i64>,
    reading_time: Option<i64>,
    published_at: Option<DateTime<Utc>>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE expressions SET
            crawled_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
            http_status = ?, content_type = ?, content_length = ?,
            title = ?, description = ?, keywords = ?, canonical_url = ?,
            language = ?, content = ?, readable = ?, source_tag = ?,
            word_count = ?, reading_time = ?, published_at = ?,
            readable_at = CASE WHEN ? IS NOT NULL THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now') ELSE readable_at END
         WHERE id = ?",
    )
    .bind(http_status)
    .bind(content_type)
    .bind(content_length)
    .bind(title)
    .bind(description)
    .bind(keywords)
    .bind(canonical_url)
    .bind(language)
    .bind(content)
    .bind(readable)
    .bind(source_tag)
    .bind(word_count)
    .bind(reading_time)
    .bind(published_at)
    .bind(readable)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_relevance(pool: &SqlitePool, id: i64, relevance: f64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE expressions SET relevance = ? WHERE id = ?")
        .bind(relevance)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_quality_score(pool: &SqlitePool, id: i64, score: f64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE expressions SET quality_score = ? WHERE id = ?")
        .bind(score)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_llm_validation(
    pool: &SqlitePool,
    id: i64,
    valid_llm: &str,
    valid_model: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE expressions SET valid_llm = ?, valid_model = ? WHERE id = ?")
        .bind(valid_llm)
        .bind(valid_model)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_sentiment(
    pool: &SqlitePool,
    id: i64,
    sentiment_score: f64,
    sentiment_label: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE expressions SET sentiment_score = ?, sentiment_label = ? WHERE id = ?")
        .bind(sentiment_score)
        .bind(sentiment_label)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Marks an expression as processed for this crawl pass. Set whenever a
/// readable body was saved, independent of whether it cleared relevance
/// (§4.8 "approved_at is set regardless of relevance").
pub async fn mark_approved(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE expressions SET approved_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
