use sqlx::SqlitePool;

/// Idempotent directed edge insert; the `source_id != target_id` check
/// is also enforced at the schema level (§8 "no self-edges").
pub async fn create_if_absent(
    pool: &SqlitePool,
    source_id: i64,
    target_id: i64,
    anchor_text: Option<&str>,
    rel_attribute: Option<&str>,
    link_type: &str,
) -> Result<(), sqlx::Error> {
    if source_id == target_id {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO expression_links (source_id, target_id, anchor_text, rel_attribute, link_type)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (source_id, target_id) DO NOTHING",
    )
    .bind(source_id)
    .bind(target_id)
    .bind(anchor_text)
    .bind(rel_attribute)
    .bind(link_type)
    .execute(pool)
    .await?;
    Ok(())
}
