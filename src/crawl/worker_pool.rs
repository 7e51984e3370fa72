//! HTTP-fetch-only worker pool (§5): runs many fetches concurrently via
//! `buffer_unordered`, the same pattern `tools/crawl.rs`'s website
//! crawler used, but stops at the fetch boundary — extraction, scoring
//! and the DB writes that follow stay on the sequential path in
//! `engine::crawl_expressions` so SQLite only ever sees one writer.

use crate::core::types::Expression;
use futures::stream::{self, StreamExt};

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub expression_id: i64,
    pub status: Option<i32>,
    pub content_type: Option<String>,
    pub html: Option<String>,
}

/// Fetch every expression's URL with up to `concurrency` requests in
/// flight at once. A transport failure yields a `status: None` outcome
/// rather than aborting the batch — the caller decides what to do with
/// a partial page set.
pub async fn fetch_concurrently(
    http_client: &reqwest::Client,
    expressions: &[Expression],
    concurrency: usize,
) -> Vec<FetchOutcome> {
    stream::iter(expressions.iter().cloned())
        .map(|expr| {
            let client = http_client.clone();
            async move { fetch_one(&client, &expr).await }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

async fn fetch_one(http_client: &reqwest::Client, expr: &Expression) -> FetchOutcome {
    let response = match http_client.get(&expr.url).send().await {
        Ok(r) => r,
        Err(_) => {
            return FetchOutcome { expression_id: expr.id, status: None, content_type: None, html: None }
        }
    };

    let status = response.status().as_u16() as i32;
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let html = response.text().await.ok();

    FetchOutcome { expression_id: expr.id, status: Some(status), content_type, html }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_batch_yields_empty_results() {
        let client = reqwest::Client::new();
        let outcomes = fetch_concurrently(&client, &[], 4).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_yields_none_status_not_a_panic() {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();
        let expr = Expression {
            id: 1,
            land_id: 1,
            domain_id: 1,
            url: "http://127.0.0.1:1".to_string(),
            url_hash: "h".to_string(),
            depth: 0,
            created_at: chrono::Utc::now(),
            crawled_at: None,
            approved_at: None,
            readable_at: None,
            published_at: None,
            last_modified: None,
            http_status: None,
            content_type: None,
            content_length: None,
            etag: None,
            title: None,
            description: None,
            keywords: None,
            canonical_url: None,
            language: None,
            content: None,
            readable: None,
            source_tag: None,
            word_count: None,
            reading_time: None,
            relevance: None,
            quality_score: None,
            sentiment_score: None,
            sentiment_label: None,
            valid_llm: None,
            valid_model: None,
        };
        let outcomes = fetch_concurrently(&client, &[expr], 1).await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].status.is_none());
    }
}
