use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// A user-scoped research topic: seed URLs + weighted keyword dictionary +
/// accepted language tags. Never auto-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Land {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered list of accepted language tags, e.g. `["fr", "en"]`.
    pub lang: Json<Vec<String>>,
    /// Seed URLs materialized as depth-0 Expressions at first crawl.
    pub start_urls: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Land {
    pub fn languages(&self) -> &[String] {
        &self.lang.0
    }

    pub fn primary_language(&self) -> &str {
        self.lang.0.first().map(|s| s.as_str()).unwrap_or("fr")
    }
}

/// `(language, word)` unique; carries its normalized lemma and base frequency.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Word {
    pub id: i64,
    pub language: String,
    pub word: String,
    pub lemma: String,
    pub frequency: f64,
}

/// Land x Word, carrying a weight in `[0, inf)`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LandDictionary {
    pub land_id: i64,
    pub word_id: i64,
    pub weight: f64,
}

/// Netloc-scoped aggregate under a Land.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Domain {
    pub id: i64,
    pub land_id: i64,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub last_crawled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_http_status: Option<i32>,
    #[serde(default)]
    pub last_source_tag: Option<String>,
}

/// SHA-256 hex digest of a canonicalized URL, used as the dedup key
/// for `(land_id, url_hash)` uniqueness on `expressions` and
/// `(expression_id, url_hash)` on `media`.
pub fn url_hash(url: &str) -> String {
    use sha2::{Digest, Sha256};
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

/// A crawled URL within a Land.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Expression {
    pub id: i64,
    pub land_id: i64,
    pub domain_id: i64,
    pub url: String,
    pub url_hash: String,
    pub depth: i64,

    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub crawled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub readable_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<String>,

    #[serde(default)]
    pub http_status: Option<i32>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_length: Option<i64>,
    #[serde(default)]
    pub etag: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub readable: Option<String>,
    #[serde(default)]
    pub source_tag: Option<String>,

    #[serde(default)]
    pub word_count: Option<i64>,
    #[serde(default)]
    pub reading_time: Option<i64>,
    #[serde(default)]
    pub relevance: Option<f64>,
    #[serde(default)]
    pub quality_score: Option<f64>,

    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub sentiment_label: Option<String>,

    /// `oui` / `non` / null — preserved verbatim, part of the external data model.
    #[serde(default)]
    pub valid_llm: Option<String>,
    #[serde(default)]
    pub valid_model: Option<String>,
}

/// Directed edge `source -> target`; unique per pair, self-edges forbidden.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExpressionLink {
    pub id: i64,
    pub source_id: i64,
    pub target_id: i64,
    #[serde(default)]
    pub anchor_text: Option<String>,
    #[serde(default)]
    pub rel_attribute: Option<String>,
    pub link_type: String, // internal | external
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

/// `(expression_id, url_hash)` unique.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Media {
    pub id: i64,
    pub expression_id: i64,
    pub url: String,
    pub url_hash: String,
    pub media_type: String,

    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub color_mode: Option<String>,
    #[serde(default)]
    pub has_transparency: Option<bool>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub image_hash: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub dominant_colors: Option<Json<Vec<DominantColor>>>,
    #[serde(default)]
    pub web_safe_histogram: Option<Json<Vec<WebSafeBucket>>>,
    #[serde(default)]
    pub exif: Option<Json<ExifData>>,

    pub is_processed: bool,
    #[serde(default)]
    pub processing_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DominantColor {
    pub rgb: (u8, u8, u8),
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSafeBucket {
    pub hex: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExifData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
}

/// `(expression_id, text_hash)` unique; consumer of `readable`, not produced
/// by this pipeline — modeled only so downstream storage has somewhere to
/// attach paragraph-level records.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Paragraph {
    pub id: i64,
    pub expression_id: i64,
    pub text_hash: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

/// Opaque work-unit with a lifecycle and a progress broadcast channel.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CrawlJob {
    pub id: i64,
    pub job_type: String,
    pub status: String,
    #[serde(default)]
    pub parameters: Option<Json<serde_json::Value>>,
    #[serde(default)]
    pub result_data: Option<Json<serde_json::Value>>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CrawlJob {
    pub fn progress_channel(&self) -> String {
        format!("crawl_progress_{}", self.id)
    }
}

/// Outbound progress envelope published on `crawl_progress_{job_id}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEnvelope {
    pub task_id: String,
    pub land_id: i64,
    pub job_id: i64,
    pub current: u64,
    pub total: u64,
    pub percentage: f64,
    pub message: String,
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

/// The minimal read-only capability set the Quality Scorer and Relevance
/// Engine operate on (§9 "duck-typed mock expressions" redesign point).
/// Built once per Expression from the persisted row plus the parent Land,
/// never mutated.
#[derive(Debug, Clone)]
pub struct ExpressionView<'a> {
    pub http_status: Option<i32>,
    pub content_type: Option<&'a str>,
    pub crawled_at: Option<DateTime<Utc>>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub keywords: Option<&'a str>,
    pub canonical_url: Option<&'a str>,
    pub word_count: Option<i64>,
    pub content_length: Option<i64>,
    pub reading_time: Option<i64>,
    pub language: Option<&'a str>,
    pub relevance: Option<f64>,
    pub published_at: Option<DateTime<Utc>>,
    pub valid_llm: Option<&'a str>,
    pub readable: Option<&'a str>,
    pub readable_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl<'a> ExpressionView<'a> {
    pub fn from_expression(expr: &'a Expression) -> Self {
        Self {
            http_status: expr.http_status,
            content_type: expr.content_type.as_deref(),
            crawled_at: expr.crawled_at,
            title: expr.title.as_deref(),
            description: expr.description.as_deref(),
            keywords: expr.keywords.as_deref(),
            canonical_url: expr.canonical_url.as_deref(),
            word_count: expr.word_count,
            content_length: expr.content_length,
            reading_time: expr.reading_time,
            language: expr.language.as_deref(),
            relevance: expr.relevance,
            published_at: expr.published_at,
            valid_llm: expr.valid_llm.as_deref(),
            readable: expr.readable.as_deref(),
            readable_at: expr.readable_at,
            approved_at: expr.approved_at,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LandView<'a> {
    pub languages: &'a [String],
}

impl<'a> LandView<'a> {
    pub fn from_land(land: &'a Land) -> Self {
        Self {
            languages: land.languages(),
        }
    }
}
