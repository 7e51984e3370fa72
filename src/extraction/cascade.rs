//! Extraction Cascade driver (C3, §4.3): runs the ordered extractor
//! chain and stops at the first rung that clears its acceptance gate.

use super::media_markdown::enrich_with_media_markers;
use super::metadata::PageMetadata;
use super::{archive, heuristic, primary};
use crate::core::types::MediaType;
use chrono::{DateTime, Utc};
use std::sync::OnceLock;
use url::Url;

const PRIMARY_MIN_CHARS: usize = 100;
const ARCHIVE_MIN_CHARS: usize = 100;
const HEURISTIC_SMART_MIN_CHARS: usize = 200;
const HEURISTIC_BASIC_MIN_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionAttempt {
    Primary,
    Archive,
    HeuristicSmart,
    HeuristicBasic,
    Failed,
}

impl ExtractionAttempt {
    pub fn source_tag(&self) -> &'static str {
        match self {
            ExtractionAttempt::Primary => "primary",
            ExtractionAttempt::Archive => "archive",
            ExtractionAttempt::HeuristicSmart => "heuristic_smart",
            ExtractionAttempt::HeuristicBasic => "heuristic_basic",
            ExtractionAttempt::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaRef {
    pub url: String,
    pub media_type: MediaType,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    pub readable: Option<String>,
    pub readable_html: Option<String>,
    pub content: Option<String>,
    pub source_tag: &'static str,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub language: Option<String>,
    pub canonical_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub media_list: Vec<MediaRef>,
    pub links: Vec<String>,
    /// Only set on the heuristic rungs: the matched subtree's own HTML,
    /// for C7 to DOM-walk instead of the full page (§4.7).
    pub filtered_subtree_html: Option<String>,
}

/// Run the full cascade against `html` for `url`. `html` is `None`
/// when the caller only wants the archival/heuristic rungs tried
/// against a page it couldn't fetch directly — the cascade then
/// starts at the archival rung.
pub async fn extract(
    http_client: &reqwest::Client,
    archive_api_base_url: &str,
    url: &Url,
    html: Option<&str>,
) -> ExtractedContent {
    if let Some(html) = html {
        if let Some(primary_result) = primary::extract(html, url) {
            if primary_result.readable.chars().count() >= PRIMARY_MIN_CHARS {
                return finish(
                    ExtractionAttempt::Primary,
                    primary_result.readable,
                    primary_result.readable_html,
                    Some(html.to_string()),
                    primary_result.metadata,
                    url,
                );
            }
        }
    }

    if let Some(archive_result) = archive::extract(http_client, archive_api_base_url, url).await {
        if archive_result.readable.chars().count() >= ARCHIVE_MIN_CHARS {
            return finish(
                ExtractionAttempt::Archive,
                archive_result.readable,
                archive_result.readable_html.clone(),
                Some(archive_result.readable_html),
                archive_result.metadata,
                url,
            );
        }
    }

    if let Some(html) = html {
        let (smart, smart_subtree) = heuristic::smart_main_extraction_with_subtree(html);
        if smart.chars().count() >= HEURISTIC_SMART_MIN_CHARS {
            let metadata = super::metadata::extract_page_metadata(html, url);
            return finish_heuristic(
                ExtractionAttempt::HeuristicSmart,
                smart,
                smart_subtree,
                html,
                metadata,
                url,
            );
        }

        let (basic, basic_subtree) = heuristic::basic_extraction_with_subtree(html);
        if basic.chars().count() >= HEURISTIC_BASIC_MIN_CHARS {
            let metadata = super::metadata::extract_page_metadata(html, url);
            return finish_heuristic(
                ExtractionAttempt::HeuristicBasic,
                basic,
                basic_subtree,
                html,
                metadata,
                url,
            );
        }
    }

    ExtractedContent {
        content: html.map(|h| h.to_string()),
        source_tag: ExtractionAttempt::Failed.source_tag(),
        ..Default::default()
    }
}

fn finish(
    attempt: ExtractionAttempt,
    readable: String,
    readable_html: String,
    content: Option<String>,
    metadata: PageMetadata,
    url: &Url,
) -> ExtractedContent {
    let enriched = enrich_with_media_markers(&readable, &readable_html, url);
    let media_list = harvest_media(&enriched);
    let links = harvest_links(&enriched);

    ExtractedContent {
        readable: Some(enriched),
        readable_html: Some(readable_html),
        content,
        source_tag: attempt.source_tag(),
        title: metadata.title.or_else(|| Some(url.to_string())),
        description: metadata.description,
        keywords: metadata.keywords,
        language: metadata.language,
        canonical_url: metadata.canonical_url,
        published_at: metadata.published_at,
        media_list,
        links,
        filtered_subtree_html: None,
    }
}

/// The heuristic rungs don't go through `enrich_with_media_markers`
/// (there is no separate "readable HTML" rendering distinct from the
/// source document) — media/link discovery over their filtered
/// subtree is done by C7, walking `filtered_subtree_html` directly.
fn finish_heuristic(
    attempt: ExtractionAttempt,
    readable: String,
    filtered_subtree_html: Option<String>,
    html: &str,
    metadata: PageMetadata,
    url: &Url,
) -> ExtractedContent {
    ExtractedContent {
        readable: Some(readable),
        readable_html: None,
        content: Some(html.to_string()),
        source_tag: attempt.source_tag(),
        title: metadata.title.or_else(|| Some(url.to_string())),
        description: metadata.description,
        keywords: metadata.keywords,
        language: metadata.language,
        canonical_url: metadata.canonical_url,
        published_at: metadata.published_at,
        media_list: Vec::new(),
        links: Vec::new(),
        filtered_subtree_html,
    }
}

fn image_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").unwrap())
}

fn video_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\[VIDEO:\s*([^\]]+)\]").unwrap())
}

fn audio_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\[AUDIO:\s*([^\]]+)\]").unwrap())
}

/// `[text](url)` matches not preceded by `!` (§4.3 link extraction).
fn link_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"(?:[^!]|^)\[([^\]]*)\]\(([^)]+)\)").unwrap())
}

fn harvest_media(markdown: &str) -> Vec<MediaRef> {
    let mut out = Vec::new();
    for cap in image_re().captures_iter(markdown) {
        out.push(MediaRef { url: cap[1].trim().to_string(), media_type: MediaType::Image });
    }
    for cap in video_re().captures_iter(markdown) {
        out.push(MediaRef { url: cap[1].trim().to_string(), media_type: MediaType::Video });
    }
    for cap in audio_re().captures_iter(markdown) {
        out.push(MediaRef { url: cap[1].trim().to_string(), media_type: MediaType::Audio });
    }
    out
}

fn harvest_links(markdown: &str) -> Vec<String> {
    link_re()
        .captures_iter(markdown)
        .filter_map(|c| c.get(2).map(|m| m.as_str().trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_through_to_heuristic_smart_when_readability_is_too_thin() {
        let html = r#"<html><body><article><p>one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen twenty twentyone twentytwo twentythree twentyfour twentyfive twentysix twentyseven twentyeight twentynine thirty thirtyone thirtytwo thirtythree thirtyfour thirtyfive thirtysix thirtyseven thirtyeight thirtynine forty</p></article></body></html>"#;
        let client = reqwest::Client::new();
        let url = Url::parse("https://example.com/article").unwrap();
        let result = extract(&client, "https://archive.org", &url, Some(html)).await;
        assert!(result.source_tag == "primary" || result.source_tag == "heuristic_smart");
        assert!(result.readable.is_some());
    }

    #[test]
    fn harvests_links_but_not_image_markers() {
        let md = "See [docs](https://example.com/docs) and ![pic](https://example.com/a.jpg)";
        let links = harvest_links(md);
        assert_eq!(links, vec!["https://example.com/docs".to_string()]);
    }

    #[test]
    fn harvests_media_markers_by_type() {
        let md = "![IMAGE](https://e.com/a.jpg)\n[VIDEO: https://e.com/b.mp4]\n[AUDIO: https://e.com/c.mp3]";
        let media = harvest_media(md);
        assert_eq!(media.len(), 3);
        assert!(media.iter().any(|m| matches!(m.media_type, MediaType::Image)));
        assert!(media.iter().any(|m| matches!(m.media_type, MediaType::Video)));
        assert!(media.iter().any(|m| matches!(m.media_type, MediaType::Audio)));
    }
}
