//! Crawl Engine (C8, §4.8): fetch -> extract -> score -> persist -> discover,
//! one Expression at a time. Ported from `crawler_engine.py`'s
//! `prepare_crawl` / `crawl_land` / `crawl_expressions` / `crawl_expression`
//! quartet, onto this crate's repo/extraction/relevance/quality/graph layers.

use crate::core::config::Settings;
use crate::core::error::CrawlError;
use crate::core::types::{url_hash, Expression, ExpressionView, Land, LandView};
use crate::crawl::worker_pool::{self, FetchOutcome};
use crate::external::{LlmValidator, SentimentService};
use crate::extraction;
use crate::graph;
use crate::quality;
use crate::relevance;
use crate::repo;
use std::collections::HashMap;
use url::Url;

/// Per-run tallies, mirroring the Python engine's `http_stats` dict keyed
/// by status-code-string (or `"error"` for transport failures).
#[derive(Debug, Default, Clone)]
pub struct CrawlStats {
    pub processed: usize,
    pub errors: usize,
    pub http_stats: HashMap<String, usize>,
}

impl CrawlStats {
    fn record(&mut self, status: Option<i32>) {
        self.processed += 1;
        let key = match status {
            Some(code) => code.to_string(),
            None => "error".to_string(),
        };
        *self.http_stats.entry(key).or_insert(0) += 1;
        if status.is_none() {
            self.errors += 1;
        }
    }
}

/// Optional narrowing of the pending-work selection (§4.8's
/// `depth_filter`/`http_status_filter` parameters) plus the `enable_llm`
/// gate on the LLM Validator call.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrawlOptions {
    pub depth_filter: Option<i64>,
    pub http_status_filter: Option<i32>,
    pub enable_llm: bool,
}

/// Materialize `land.start_urls` as depth-0 Expressions the first time a
/// Land is crawled, then return its pending (un-approved) work queue.
pub async fn prepare_crawl(
    pool: &sqlx::SqlitePool,
    land: &Land,
    limit: i64,
) -> Result<Vec<Expression>, CrawlError> {
    prepare_crawl_filtered(pool, land, limit, CrawlOptions::default()).await
}

pub async fn prepare_crawl_filtered(
    pool: &sqlx::SqlitePool,
    land: &Land,
    limit: i64,
    options: CrawlOptions,
) -> Result<Vec<Expression>, CrawlError> {
    let already_pending = repo::expression::select_pending(pool, land.id, 1).await?;

    if already_pending.is_empty() {
        for start_url in land.start_urls.0.iter() {
            let Ok(parsed) = Url::parse(start_url) else { continue };
            let Some(host) = parsed.host_str().map(str::to_lowercase) else { continue };
            let domain = repo::domain::upsert(pool, land.id, &host).await?;
            let hash = url_hash(start_url);
            repo::expression::create_if_absent(pool, land.id, domain.id, start_url, &hash, 0).await?;
        }
    }

    Ok(repo::expression::select_pending_filtered(
        pool,
        land.id,
        limit,
        options.depth_filter,
        options.http_status_filter,
    )
    .await?)
}

/// Crawl up to `limit` pending expressions for `land` sequentially,
/// never letting one expression's failure abort the batch (§4.8).
pub async fn crawl_land(
    pool: &sqlx::SqlitePool,
    http_client: &reqwest::Client,
    land: &Land,
    settings: &Settings,
    llm_validator: &dyn LlmValidator,
    sentiment_service: &dyn SentimentService,
    limit: i64,
) -> Result<CrawlStats, CrawlError> {
    crawl_land_filtered(
        pool,
        http_client,
        land,
        settings,
        llm_validator,
        sentiment_service,
        limit,
        CrawlOptions { enable_llm: settings.openrouter.resolve_enabled(), ..CrawlOptions::default() },
    )
    .await
}

/// Top-level `crawl_land` operation per §4.8, taking the full parameter
/// set (`depth_filter`, `http_status_filter`, `enable_llm`); `analyze_media`
/// is read from `Settings` directly (§6 config key) rather than threaded
/// here, matching how every other per-Expression behavior flag is sourced.
pub async fn crawl_land_filtered(
    pool: &sqlx::SqlitePool,
    http_client: &reqwest::Client,
    land: &Land,
    settings: &Settings,
    llm_validator: &dyn LlmValidator,
    sentiment_service: &dyn SentimentService,
    limit: i64,
    options: CrawlOptions,
) -> Result<CrawlStats, CrawlError> {
    let pending = prepare_crawl_filtered(pool, land, limit, options).await?;
    crawl_expressions(pool, http_client, land, settings, llm_validator, sentiment_service, &pending, options.enable_llm).await
}

pub async fn crawl_expressions(
    pool: &sqlx::SqlitePool,
    http_client: &reqwest::Client,
    land: &Land,
    settings: &Settings,
    llm_validator: &dyn LlmValidator,
    sentiment_service: &dyn SentimentService,
    expressions: &[Expression],
    enable_llm: bool,
) -> Result<CrawlStats, CrawlError> {
    let dictionary = repo::word::load_weighted_dictionary(pool, land.id).await?;
    let mut stats = CrawlStats::default();

    for expr in expressions {
        match crawl_expression(pool, http_client, expr, land, &dictionary, settings, llm_validator, sentiment_service, enable_llm).await {
            Ok(status) => stats.record(status),
            Err(_) => stats.record(None),
        }
    }

    Ok(stats)
}

/// Parallel variant (§5): fans fetches out across `concurrency` requests
/// in flight via [`worker_pool::fetch_concurrently`], then replays
/// extraction/scoring/persistence sequentially so SQLite only ever sees
/// one writer. Wall-clock wins on the HTTP-bound part only.
pub async fn crawl_land_parallel(
    pool: &sqlx::SqlitePool,
    http_client: &reqwest::Client,
    land: &Land,
    settings: &Settings,
    llm_validator: &dyn LlmValidator,
    sentiment_service: &dyn SentimentService,
    limit: i64,
    concurrency: usize,
) -> Result<CrawlStats, CrawlError> {
    let options = CrawlOptions { enable_llm: settings.openrouter.resolve_enabled(), ..CrawlOptions::default() };
    let pending = prepare_crawl_filtered(pool, land, limit, options).await?;
    let dictionary = repo::word::load_weighted_dictionary(pool, land.id).await?;
    let outcomes = worker_pool::fetch_concurrently(http_client, &pending, concurrency).await;
    let mut by_id: HashMap<i64, FetchOutcome> = outcomes.into_iter().map(|o| (o.expression_id, o)).collect();

    let mut stats = CrawlStats::default();
    for expr in &pending {
        let outcome = by_id.remove(&expr.id).unwrap_or(FetchOutcome {
            expression_id: expr.id,
            status: None,
            content_type: None,
            html: None,
        });
        match process_fetch_outcome(
            pool,
            http_client,
            expr,
            land,
            &dictionary,
            settings,
            llm_validator,
            sentiment_service,
            outcome,
            options.enable_llm,
        )
        .await
        {
            Ok(status) => stats.record(status),
            Err(_) => stats.record(None),
        }
    }

    Ok(stats)
}

/// Fetch, extract, score and persist a single Expression, discovering
/// its outbound link/media graph along the way. Returns the HTTP status
/// observed (or `Ok(None)` for a transport-level failure the caller
/// should still count, not propagate — only DB errors bubble up).
#[allow(clippy::too_many_arguments)]
pub async fn crawl_expression(
    pool: &sqlx::SqlitePool,
    http_client: &reqwest::Client,
    expr: &Expression,
    land: &Land,
    dictionary: &HashMap<String, f64>,
    settings: &Settings,
    llm_validator: &dyn LlmValidator,
    sentiment_service: &dyn SentimentService,
    enable_llm: bool,
) -> Result<Option<i32>, CrawlError> {
    let url = match Url::parse(&expr.url) {
        Ok(u) => u,
        Err(_) => {
            repo::expression::record_fetch(
                pool, expr.id, None, None, None, None, None, None, None, None, None,
                Some("failed"), None, None, None,
            )
            .await?;
            return Ok(None);
        }
    };

    let response = match http_client.get(url.clone()).send().await {
        Ok(r) => r,
        Err(_) => {
            // Transport failure: §7 maps this to http_status = 0, distinct
            // from the unreachable-URL case above which never attempted a
            // fetch at all. Still bucketed under http_stats["error"].
            repo::expression::record_fetch(
                pool, expr.id, Some(0), None, None, None, None, None, None, None, None,
                Some("failed"), None, None, None,
            )
            .await?;
            return Ok(None);
        }
    };

    let status = response.status().as_u16() as i32;
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let html = response.text().await.ok();

    process_fetch_outcome(
        pool,
        http_client,
        expr,
        land,
        dictionary,
        settings,
        llm_validator,
        sentiment_service,
        FetchOutcome { expression_id: expr.id, status: Some(status), content_type, html },
        enable_llm,
    )
    .await
}

/// Shared tail of the per-Expression pipeline (§4.8 steps 2 onward),
/// taking an already-fetched [`FetchOutcome`] so the sequential and
/// [`crawl_land_parallel`] entry points share one code path past the
/// HTTP fetch.
#[allow(clippy::too_many_arguments)]
async fn process_fetch_outcome(
    pool: &sqlx::SqlitePool,
    http_client: &reqwest::Client,
    expr: &Expression,
    land: &Land,
    dictionary: &HashMap<String, f64>,
    settings: &Settings,
    llm_validator: &dyn LlmValidator,
    sentiment_service: &dyn SentimentService,
    outcome: FetchOutcome,
    enable_llm: bool,
) -> Result<Option<i32>, CrawlError> {
    let Some(status) = outcome.status else {
        repo::expression::record_fetch(
            pool, expr.id, Some(0), None, None, None, None, None, None, None, None,
            Some("failed"), None, None, None,
        )
        .await?;
        return Ok(None);
    };

    let url = match Url::parse(&expr.url) {
        Ok(u) => u,
        Err(_) => return Ok(Some(status)),
    };
    let content_type = outcome.content_type;
    let html = outcome.html;
    let content_length = html.as_ref().map(|h| h.len() as i64);

    let extracted = extraction::extract(
        http_client,
        &settings.resolve_archive_api_base_url(),
        &url,
        html.as_deref(),
    )
    .await;

    let word_count = extracted.readable.as_ref().map(|r| r.split_whitespace().count() as i64);
    let reading_time = word_count.and_then(|wc| if wc > 0 { Some((wc / 200).max(1)) } else { None });

    repo::expression::record_fetch(
        pool,
        expr.id,
        Some(status),
        content_type.as_deref(),
        content_length,
        extracted.title.as_deref(),
        extracted.description.as_deref(),
        extracted.keywords.as_deref(),
        extracted.canonical_url.as_deref(),
        extracted.language.as_deref(),
        extracted.content.as_deref(),
        extracted.readable.as_deref(),
        Some(extracted.source_tag),
        word_count,
        reading_time,
        extracted.published_at,
    )
    .await?;

    repo::domain::record_fetch(
        pool,
        expr.domain_id,
        extracted.title.as_deref(),
        extracted.description.as_deref(),
        extracted.language.as_deref(),
        Some(status),
        Some(extracted.source_tag),
    )
    .await?;

    let lang = extracted.language.as_deref().unwrap_or_else(|| land.primary_language());
    let mut relevance = relevance::expression_relevance(
        extracted.title.as_deref(),
        extracted.readable.as_deref(),
        lang,
        dictionary,
    );
    repo::expression::set_relevance(pool, expr.id, relevance).await?;

    // LLM validation only runs when enabled (§4.8 `enable_llm`) and only
    // makes sense for candidates the dictionary already thinks are
    // on-topic; a rejection zeroes relevance (§6).
    if enable_llm && relevance > 0.0 {
        if let Ok(validation) = llm_validator
            .validate_expression_relevance(&land.name, extracted.title.as_deref(), extracted.readable.as_deref())
            .await
        {
            repo::expression::set_llm_validation(pool, expr.id, &validation.valid_llm, &validation.model).await?;
            if validation.valid_llm == "non" {
                relevance = 0.0;
                repo::expression::set_relevance(pool, expr.id, relevance).await?;
            }
        }
    }

    if settings.resolve_sentiment_enabled() {
        if let Some(text) = extracted.readable.as_deref() {
            if let Ok(result) = sentiment_service.analyze(text).await {
                repo::expression::set_sentiment(pool, expr.id, result.score, &result.label).await?;
            }
        }
    }

    if settings.resolve_quality_scoring_enabled() {
        let mut scored = expr.clone();
        scored.http_status = Some(status);
        scored.content_type = content_type.clone();
        scored.content_length = content_length;
        scored.crawled_at = Some(chrono::Utc::now());
        scored.title = extracted.title.clone();
        scored.description = extracted.description.clone();
        scored.keywords = extracted.keywords.clone();
        scored.canonical_url = extracted.canonical_url.clone();
        scored.language = extracted.language.clone();
        scored.readable = extracted.readable.clone();
        scored.readable_at = extracted.readable.as_ref().map(|_| chrono::Utc::now());
        scored.word_count = word_count;
        scored.reading_time = reading_time;
        scored.published_at = extracted.published_at;
        scored.relevance = Some(relevance);
        scored.approved_at = Some(chrono::Utc::now());

        let view = ExpressionView::from_expression(&scored);
        let land_view = LandView::from_land(land);
        let report = quality::score_expression(&view, &land_view, &settings.resolve_quality_weights());
        repo::expression::set_quality_score(pool, expr.id, report.score).await?;
    }

    // Approved iff readable was saved this crawl, regardless of relevance
    // (§3 "approved_at is set iff readable content was saved this crawl").
    if extracted.readable.is_some() {
        repo::expression::mark_approved(pool, expr.id).await?;
    }

    let media_ctx = settings.media.resolve_analyze_media().then_some(graph::MediaAnalysisContext {
        http_client,
        max_file_size_bytes: settings.media.resolve_max_file_size_mb() * 1024 * 1024,
        n_dominant_colors: settings.media.resolve_n_dominant_colors(),
        compute_palette: true,
    });
    graph::discover(pool, expr, &extracted, media_ctx).await?;

    Ok(Some(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_bucket_by_status_code_string_or_error() {
        let mut stats = CrawlStats::default();
        stats.record(Some(200));
        stats.record(Some(200));
        stats.record(Some(404));
        stats.record(None);

        assert_eq!(stats.processed, 4);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.http_stats.get("200"), Some(&2));
        assert_eq!(stats.http_stats.get("404"), Some(&1));
        assert_eq!(stats.http_stats.get("error"), Some(&1));
    }
}
