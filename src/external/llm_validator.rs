//! LLM relevance validator (§6): a second opinion on whether a crawled
//! Expression is actually about the Land's topic, gating `relevance`
//! to 0 on rejection. Ported from `crawler_engine.py`'s OpenRouter call
//! site — the HTTP client and prompt live outside this crate's scope,
//! only the trait boundary does.

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct LlmValidation {
    /// `"oui"` / `"non"`, persisted verbatim into `valid_llm`.
    pub valid_llm: String,
    pub model: String,
}

#[async_trait]
pub trait LlmValidator: Send + Sync {
    async fn validate_expression_relevance(
        &self,
        land_name: &str,
        title: Option<&str>,
        readable: Option<&str>,
    ) -> anyhow::Result<LlmValidation>;
}

/// Always approves. The real validator is an external OpenRouter-backed
/// service configured via `OpenRouterConfig`; this crate only owns the
/// call site, not a model integration.
pub struct NoOpLlmValidator;

#[async_trait]
impl LlmValidator for NoOpLlmValidator {
    async fn validate_expression_relevance(
        &self,
        _land_name: &str,
        _title: Option<&str>,
        _readable: Option<&str>,
    ) -> anyhow::Result<LlmValidation> {
        Ok(LlmValidation { valid_llm: "oui".to_string(), model: "noop".to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_validator_always_approves() {
        let v = NoOpLlmValidator;
        let result = v.validate_expression_relevance("land", Some("t"), Some("c")).await.unwrap();
        assert_eq!(result.valid_llm, "oui");
    }
}
