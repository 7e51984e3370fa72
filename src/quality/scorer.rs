use crate::core::config::QualityWeights;
use crate::core::types::{ExpressionView, LandView};
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum QualityCategory {
    Excellent,
    Bon,
    Moyen,
    Faible,
    TresFaible,
}

impl QualityCategory {
    fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            QualityCategory::Excellent
        } else if score >= 0.6 {
            QualityCategory::Bon
        } else if score >= 0.4 {
            QualityCategory::Moyen
        } else if score >= 0.2 {
            QualityCategory::Faible
        } else {
            QualityCategory::TresFaible
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct QualityReport {
    pub score: f64,
    pub category: QualityCategory,
    pub reason: String,
    pub flags: Vec<String>,
}

struct BlockResult {
    score: f64,
    flags: Vec<String>,
    blocking: bool,
}

impl BlockResult {
    fn simple(score: f64, flags: Vec<String>) -> Self {
        Self { score, flags, blocking: false }
    }
}

/// Score an Expression across the five weighted blocks (§4.6, ported
/// from `QualityScorer`). `weights` must already have been validated to
/// sum to 1.0 (boot-time config check) — this function trusts that.
pub fn score_expression(
    expr: &ExpressionView<'_>,
    land: &LandView<'_>,
    weights: &QualityWeights,
) -> QualityReport {
    let access = score_access(expr);
    let structure = score_structure(expr);
    let richness = score_richness(expr);
    let coherence = score_coherence(expr, land);
    let integrity = score_integrity(expr);

    let mut flags = Vec::new();
    flags.extend(access.flags.clone());
    flags.extend(structure.flags.clone());
    flags.extend(richness.flags.clone());
    flags.extend(coherence.flags.clone());
    flags.extend(integrity.flags.clone());

    let raw = if access.blocking {
        0.0
    } else {
        weights.access * access.score
            + weights.structure * structure.score
            + weights.richness * richness.score
            + weights.coherence * coherence.score
            + weights.integrity * integrity.score
    };

    let score = raw.clamp(0.0, 1.0);
    let category = QualityCategory::from_score(score);
    let reason = build_reason(score, &category, &flags);

    QualityReport { score, category, reason, flags }
}

// --- Access (weight default 0.30) ---

fn score_access(expr: &ExpressionView<'_>) -> BlockResult {
    if expr.crawled_at.is_none() {
        return BlockResult { score: 0.0, flags: vec!["not_crawled".to_string()], blocking: true };
    }

    let Some(status) = expr.http_status else {
        return BlockResult { score: 0.0, flags: vec!["no_http_status".to_string()], blocking: true };
    };

    let (mut score, mut flags, mut blocking) = match status {
        200..=299 => (1.0, Vec::new(), false),
        300..=399 => (0.5, vec!["redirect".to_string()], false),
        _ => (0.0, vec!["http_error".to_string()], true),
    };

    if let Some(ct) = expr.content_type {
        let ct = ct.to_lowercase();
        if ct.contains("application/pdf") {
            score = 0.0;
            flags.push("non_html_pdf".to_string());
            blocking = true;
        } else if !ct.contains("text/html") {
            score *= 0.3;
            flags.push("non_html".to_string());
        }
    }

    BlockResult { score, flags, blocking }
}

// --- Structure (weight default 0.15) ---

fn score_structure(expr: &ExpressionView<'_>) -> BlockResult {
    let mut score = 0.0;
    let mut flags = Vec::new();

    if expr.title.is_some_and(|t| !t.trim().is_empty()) {
        score += 0.4;
    } else {
        flags.push("no_title".to_string());
    }

    if expr.description.is_some_and(|d| d.trim().chars().count() > 20) {
        score += 0.3;
    } else {
        flags.push("no_description".to_string());
    }

    if expr.keywords.is_some_and(|k| !k.trim().is_empty()) {
        score += 0.15;
    } else {
        flags.push("no_keywords".to_string());
    }

    if expr.canonical_url.is_some_and(|c| !c.trim().is_empty()) {
        score += 0.15;
    } else {
        flags.push("no_canonical".to_string());
    }

    BlockResult::simple(score, flags)
}

// --- Richness (weight default 0.25) ---

fn gaussian(x: f64, mean: f64, sigma: f64) -> f64 {
    (-0.5 * ((x - mean) / sigma).powi(2)).exp()
}

fn score_word_count(word_count: Option<i64>, flags: &mut Vec<String>) -> f64 {
    let Some(wc) = word_count else {
        flags.push("no_word_count".to_string());
        return 0.5;
    };
    let wc = wc as f64;

    if wc < 80.0 {
        flags.push("very_short_content".to_string());
        return 0.1;
    }
    if wc < 150.0 {
        flags.push("short_content".to_string());
        return 0.3;
    }
    if wc <= 5000.0 {
        return gaussian(wc, 1500.0, 1500.0);
    }

    let decayed = (0.8 - (wc - 5000.0) / 50000.0).max(0.5);
    if wc > 10000.0 {
        flags.push("very_long_content".to_string());
    }
    decayed
}

fn score_text_ratio(word_count: Option<i64>, content_length: Option<i64>, flags: &mut Vec<String>) -> f64 {
    let (Some(wc), Some(cl)) = (word_count, content_length) else {
        return 0.5;
    };
    if cl <= 0 {
        return 0.5;
    }

    // Approximate rendered-text length as average-5-chars-per-word.
    let ratio = (wc as f64 * 5.0) / cl as f64;

    if ratio < 0.05 {
        flags.push("poor_text_ratio".to_string());
        0.2
    } else if ratio < 0.1 {
        flags.push("low_text_ratio".to_string());
        0.5
    } else if ratio <= 0.3 {
        1.0
    } else {
        0.9
    }
}

fn score_reading_time(reading_time: Option<i64>, flags: &mut Vec<String>) -> f64 {
    let Some(rt) = reading_time else {
        return 0.5;
    };
    let minutes = rt as f64;

    if minutes < 0.25 {
        flags.push("very_short_reading".to_string());
        0.2
    } else if minutes < 0.5 {
        flags.push("short_reading".to_string());
        0.5
    } else if minutes <= 15.0 {
        1.0
    } else if minutes <= 25.0 {
        0.8
    } else {
        flags.push("very_long_reading".to_string());
        0.3
    }
}

fn score_richness(expr: &ExpressionView<'_>) -> BlockResult {
    let mut flags = Vec::new();

    let wc_score = score_word_count(expr.word_count, &mut flags);
    let ratio_score = score_text_ratio(expr.word_count, expr.content_length, &mut flags);
    let reading_score = score_reading_time(expr.reading_time, &mut flags);

    let score = 0.5 * wc_score + 0.3 * ratio_score + 0.2 * reading_score;
    BlockResult::simple(score, flags)
}

// --- Coherence (weight default 0.20) ---

fn score_language(expr: &ExpressionView<'_>, land: &LandView<'_>, flags: &mut Vec<String>) -> f64 {
    let Some(lang) = expr.language else {
        if land.languages.is_empty() {
            flags.push("no_language".to_string());
        }
        return 0.5;
    };

    if land.languages.iter().any(|l| l == lang) {
        1.0
    } else {
        flags.push("wrong_language".to_string());
        0.0
    }
}

fn score_relevance_component(expr: &ExpressionView<'_>, flags: &mut Vec<String>) -> f64 {
    let Some(rel) = expr.relevance else {
        return 0.5;
    };
    let normalized = (rel / 5.0).min(1.0).max(0.0);
    if normalized < 0.5 {
        flags.push("low_relevance".to_string());
    }
    normalized
}

fn score_freshness(expr: &ExpressionView<'_>, flags: &mut Vec<String>) -> f64 {
    let Some(published) = expr.published_at else {
        return 0.5;
    };
    let age_days = (Utc::now() - published).num_days();

    if age_days < 0 {
        flags.push("future_date".to_string());
        0.0
    } else if age_days < 365 {
        1.0
    } else if age_days < 730 {
        0.9
    } else if age_days < 1825 {
        0.7
    } else {
        flags.push("old_content".to_string());
        0.5
    }
}

fn score_coherence(expr: &ExpressionView<'_>, land: &LandView<'_>) -> BlockResult {
    let mut flags = Vec::new();

    let lang_score = score_language(expr, land, &mut flags);
    let rel_score = score_relevance_component(expr, &mut flags);
    let fresh_score = score_freshness(expr, &mut flags);

    let score = 0.4 * lang_score + 0.4 * rel_score + 0.2 * fresh_score;
    BlockResult::simple(score, flags)
}

// --- Integrity (weight default 0.10) ---

fn score_integrity(expr: &ExpressionView<'_>) -> BlockResult {
    let mut flags = Vec::new();

    let llm_score = match expr.valid_llm {
        Some("oui") => 0.4,
        Some("non") => {
            flags.push("llm_rejected".to_string());
            0.0
        }
        _ => 0.2,
    };

    let readable_len = expr.readable.map(|r| r.trim().chars().count()).unwrap_or(0);
    let readable_score = if expr.readable_at.is_some() && readable_len > 100 {
        0.4
    } else if readable_len >= 1 {
        flags.push("short_readable".to_string());
        0.2
    } else {
        flags.push("no_readable".to_string());
        0.0
    };

    let approved_score = if expr.approved_at.is_some() {
        0.2
    } else {
        flags.push("not_approved".to_string());
        0.0
    };

    BlockResult::simple(llm_score + readable_score + approved_score, flags)
}

// --- Reason string ---

fn build_reason(score: f64, category: &QualityCategory, flags: &[String]) -> String {
    let main_issues: Vec<&str> = flags
        .iter()
        .map(String::as_str)
        .filter(|f| {
            matches!(
                *f,
                "not_crawled"
                    | "http_error"
                    | "non_html_pdf"
                    | "no_title"
                    | "very_short_content"
                    | "wrong_language"
                    | "no_readable"
                    | "not_approved"
            )
        })
        .take(3)
        .collect();

    match category {
        QualityCategory::Excellent => {
            format!("Contenu de haute qualité (score {:.2}), bien structuré et pertinent.", score)
        }
        QualityCategory::Bon => {
            format!("Contenu de bonne qualité (score {:.2}).", score)
        }
        _ if main_issues.is_empty() => {
            format!("Qualité moyenne ou faible (score {:.2}).", score)
        }
        _ => format!(
            "Qualité insuffisante (score {:.2}) : {}.",
            score,
            main_issues.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Expression, Land};
    use chrono::TimeZone;
    use sqlx::types::Json;

    fn base_expr() -> Expression {
        Expression {
            id: 1,
            land_id: 1,
            domain_id: 1,
            url: "https://example.com/a".to_string(),
            url_hash: "h".to_string(),
            depth: 0,
            created_at: Utc::now(),
            crawled_at: Some(Utc::now()),
            approved_at: Some(Utc::now()),
            readable_at: Some(Utc::now()),
            published_at: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            last_modified: None,
            http_status: Some(200),
            content_type: Some("text/html".to_string()),
            content_length: Some(10000),
            etag: None,
            title: Some("A great title".to_string()),
            description: Some("A sufficiently long description field here.".to_string()),
            keywords: Some("a,b".to_string()),
            canonical_url: Some("https://example.com/a".to_string()),
            language: Some("fr".to_string()),
            content: Some("content".to_string()),
            readable: Some("x".repeat(200)),
            source_tag: None,
            word_count: Some(1500),
            reading_time: Some(6),
            relevance: Some(4.0),
            quality_score: None,
            sentiment_score: None,
            sentiment_label: None,
            valid_llm: Some("oui".to_string()),
            valid_model: None,
        }
    }

    fn base_land() -> Land {
        Land {
            id: 1,
            name: "test".to_string(),
            description: None,
            lang: Json(vec!["fr".to_string()]),
            start_urls: Json(vec![]),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn well_formed_expression_scores_excellent() {
        let expr = base_expr();
        let land = base_land();
        let view = ExpressionView::from_expression(&expr);
        let lview = LandView::from_land(&land);
        let report = score_expression(&view, &lview, &QualityWeights::default());
        assert!(report.score >= 0.8, "expected excellent score, got {}", report.score);
        assert_eq!(report.category, QualityCategory::Excellent);
    }

    #[test]
    fn uncrawled_expression_is_blocked_to_zero() {
        let mut expr = base_expr();
        expr.crawled_at = None;
        let land = base_land();
        let view = ExpressionView::from_expression(&expr);
        let lview = LandView::from_land(&land);
        let report = score_expression(&view, &lview, &QualityWeights::default());
        assert_eq!(report.score, 0.0);
        assert!(report.flags.contains(&"not_crawled".to_string()));
    }

    #[test]
    fn http_error_blocks_regardless_of_other_scores() {
        let mut expr = base_expr();
        expr.http_status = Some(404);
        let land = base_land();
        let view = ExpressionView::from_expression(&expr);
        let lview = LandView::from_land(&land);
        let report = score_expression(&view, &lview, &QualityWeights::default());
        assert_eq!(report.score, 0.0);
    }
}
