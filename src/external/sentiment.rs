//! Sentiment analysis (§6, optional, `enable_sentiment_analysis`):
//! scores an Expression's readable content. Out of scope to implement
//! for real; this crate owns the call site and a neutral stub.

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SentimentResult {
    pub score: f64,
    pub label: String,
}

#[async_trait]
pub trait SentimentService: Send + Sync {
    async fn analyze(&self, text: &str) -> anyhow::Result<SentimentResult>;
}

/// Always neutral. Real sentiment scoring is an external service
/// configured independently of this crate.
pub struct NoOpSentimentService;

#[async_trait]
impl SentimentService for NoOpSentimentService {
    async fn analyze(&self, _text: &str) -> anyhow::Result<SentimentResult> {
        Ok(SentimentResult { score: 0.0, label: "neutral".to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_service_is_neutral() {
        let s = NoOpSentimentService;
        let r = s.analyze("anything").await.unwrap();
        assert_eq!(r.label, "neutral");
        assert_eq!(r.score, 0.0);
    }
}
