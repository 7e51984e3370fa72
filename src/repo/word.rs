use crate::core::types::{LandDictionary, Word};
use sqlx::SqlitePool;
use std::collections::HashMap;

pub async fn find_by_word(
    pool: &SqlitePool,
    language: &str,
    word: &str,
) -> Result<Option<Word>, sqlx::Error> {
    sqlx::query_as::<_, Word>("SELECT * FROM words WHERE language = ? AND word = ?")
        .bind(language)
        .bind(word)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_lemma(
    pool: &SqlitePool,
    language: &str,
    lemma: &str,
) -> Result<Option<Word>, sqlx::Error> {
    sqlx::query_as::<_, Word>("SELECT * FROM words WHERE language = ? AND lemma = ? LIMIT 1")
        .bind(language)
        .bind(lemma)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &SqlitePool,
    language: &str,
    word: &str,
    lemma: &str,
) -> Result<Word, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO words (language, word, lemma, frequency) VALUES (?, ?, ?, 1.0) RETURNING id",
    )
    .bind(language)
    .bind(word)
    .bind(lemma)
    .fetch_one(pool)
    .await?;

    sqlx::query_as::<_, Word>("SELECT * FROM words WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn find_in_land(
    pool: &SqlitePool,
    land_id: i64,
    word_id: i64,
) -> Result<Option<LandDictionary>, sqlx::Error> {
    sqlx::query_as::<_, LandDictionary>(
        "SELECT * FROM land_dictionaries WHERE land_id = ? AND word_id = ?",
    )
    .bind(land_id)
    .bind(word_id)
    .fetch_optional(pool)
    .await
}

pub async fn add_to_land(
    pool: &SqlitePool,
    land_id: i64,
    word_id: i64,
    weight: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO land_dictionaries (land_id, word_id, weight) VALUES (?, ?, ?)
         ON CONFLICT (land_id, word_id) DO NOTHING",
    )
    .bind(land_id)
    .bind(word_id)
    .bind(weight)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn clear_land_dictionary(pool: &SqlitePool, land_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM land_dictionaries WHERE land_id = ?")
        .bind(land_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn land_dictionary_count(pool: &SqlitePool, land_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM land_dictionaries WHERE land_id = ?")
        .bind(land_id)
        .fetch_one(pool)
        .await
}

/// Up to `limit` sample words from a Land's dictionary, joined for display.
pub async fn land_dictionary_sample(
    pool: &SqlitePool,
    land_id: i64,
    limit: i64,
) -> Result<Vec<Word>, sqlx::Error> {
    sqlx::query_as::<_, Word>(
        "SELECT w.* FROM words w
         JOIN land_dictionaries ld ON ld.word_id = w.id
         WHERE ld.land_id = ?
         ORDER BY w.id
         LIMIT ?",
    )
    .bind(land_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// The full lemma -> weight map the Relevance Engine scores against
/// (§4.5). Later rows win on duplicate lemmas, matching the weight
/// table's own "last value assigned" semantics.
pub async fn load_weighted_dictionary(
    pool: &SqlitePool,
    land_id: i64,
) -> Result<HashMap<String, f64>, sqlx::Error> {
    let rows: Vec<(String, f64)> = sqlx::query_as(
        "SELECT w.lemma, ld.weight FROM words w
         JOIN land_dictionaries ld ON ld.word_id = w.id
         WHERE ld.land_id = ?",
    )
    .bind(land_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}
