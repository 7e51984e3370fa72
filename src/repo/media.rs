use crate::core::types::{DominantColor, ExifData, Media, WebSafeBucket};
use sqlx::types::Json;
use sqlx::SqlitePool;

pub async fn create_if_absent(
    pool: &SqlitePool,
    expression_id: i64,
    url: &str,
    url_hash: &str,
    media_type: &str,
) -> Result<Media, sqlx::Error> {
    sqlx::query(
        "INSERT INTO media (expression_id, url, url_hash, media_type) VALUES (?, ?, ?, ?)
         ON CONFLICT (expression_id, url_hash) DO NOTHING",
    )
    .bind(expression_id)
    .bind(url)
    .bind(url_hash)
    .bind(media_type)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, Media>("SELECT * FROM media WHERE expression_id = ? AND url_hash = ?")
        .bind(expression_id)
        .bind(url_hash)
        .fetch_one(pool)
        .await
}

#[allow(clippy::too_many_arguments)]
pub async fn record_analysis(
    pool: &SqlitePool,
    id: i64,
    width: Option<i64>,
    height: Option<i64>,
    format: Option<&str>,
    color_mode: Option<&str>,
    has_transparency: Option<bool>,
    aspect_ratio: Option<f64>,
    file_size: Option<i64>,
    image_hash: Option<&str>,
    mime_type: Option<&str>,
    dominant_colors: Option<&[DominantColor]>,
    web_safe_histogram: Option<&[WebSafeBucket]>,
    exif: Option<&ExifData>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE media SET
            width = ?, height = ?, format = ?, color_mode = ?, has_transparency = ?,
            aspect_ratio = ?, file_size = ?, image_hash = ?, mime_type = ?,
            dominant_colors = ?, web_safe_histogram = ?, exif = ?,
            is_processed = 1, processing_error = NULL
         WHERE id = ?",
    )
    .bind(width)
    .bind(height)
    .bind(format)
    .bind(color_mode)
    .bind(has_transparency)
    .bind(aspect_ratio)
    .bind(file_size)
    .bind(image_hash)
    .bind(mime_type)
    .bind(dominant_colors.map(|v| Json(v.to_vec())))
    .bind(web_safe_histogram.map(|v| Json(v.to_vec())))
    .bind(exif.map(|e| Json(e.clone())))
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn record_error(pool: &SqlitePool, id: i64, error: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE media SET is_processed = 1, processing_error = ? WHERE id = ?")
        .bind(error)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
