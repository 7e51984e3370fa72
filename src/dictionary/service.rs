use super::variants::word_variations;
use crate::core::types::{Land, Word};
use crate::repo;
use crate::text::{lemma, normalize_text};
use sqlx::SqlitePool;

/// Create-or-fetch a `Word` row for `raw_word` in `language`, matching
/// first by exact `(word, language)`, then by `(lemma, language)` before
/// inserting a fresh row (§4.2 `_create_or_get_word`).
async fn create_or_get_word(
    pool: &SqlitePool,
    language: &str,
    raw_word: &str,
) -> Result<Option<Word>, sqlx::Error> {
    let normalized = normalize_text(raw_word).to_lowercase();
    if normalized.is_empty() {
        return Ok(None);
    }

    if let Some(existing) = repo::word::find_by_word(pool, language, &normalized).await? {
        return Ok(Some(existing));
    }

    let word_lemma = lemma(&normalized, language);

    if let Some(existing) = repo::word::find_by_lemma(pool, language, &word_lemma).await? {
        return Ok(Some(existing));
    }

    Ok(Some(
        repo::word::create(pool, language, &normalized, &word_lemma).await?,
    ))
}

async fn add_to_land_dictionary(
    pool: &SqlitePool,
    land_id: i64,
    word_id: i64,
) -> Result<(), sqlx::Error> {
    if repo::word::find_in_land(pool, land_id, word_id)
        .await?
        .is_some()
    {
        return Ok(());
    }
    repo::word::add_to_land(pool, land_id, word_id, 1.0).await
}

/// Seed (or rebuild) a Land's dictionary from its configured seed terms.
///
/// Skips work entirely if the dictionary already has entries, unless
/// `force_refresh` is set, in which case existing rows are cleared first
/// (§4.2 `populate_land_dictionary`).
pub async fn populate_land_dictionary(
    pool: &SqlitePool,
    land: &Land,
    seed_terms: &[String],
    force_refresh: bool,
) -> Result<usize, sqlx::Error> {
    let existing = repo::word::land_dictionary_count(pool, land.id).await?;
    if existing > 0 && !force_refresh {
        return Ok(existing as usize);
    }

    if force_refresh {
        repo::word::clear_land_dictionary(pool, land.id).await?;
    }

    let language = land.primary_language();
    let mut added = 0usize;

    for seed in seed_terms {
        if let Some(word) = create_or_get_word(pool, language, seed).await? {
            add_to_land_dictionary(pool, land.id, word.id).await?;
            added += 1;

            for variant in word_variations(&word.word, language) {
                if let Some(variant_word) = create_or_get_word(pool, language, &variant).await? {
                    add_to_land_dictionary(pool, land.id, variant_word.id).await?;
                    added += 1;
                }
            }
        }
    }

    Ok(added)
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct LandDictionaryStats {
    pub total: i64,
    pub sample: Vec<String>,
}

/// Total entry count plus a 10-word sample, for operator visibility
/// (§4.2 `get_land_dictionary_stats`).
pub async fn get_land_dictionary_stats(
    pool: &SqlitePool,
    land_id: i64,
) -> Result<LandDictionaryStats, sqlx::Error> {
    let total = repo::word::land_dictionary_count(pool, land_id).await?;
    let sample = repo::word::land_dictionary_sample(pool, land_id, 10)
        .await?
        .into_iter()
        .map(|w| w.word)
        .collect();

    Ok(LandDictionaryStats { total, sample })
}
