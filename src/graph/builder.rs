//! Discovery pass (§4.7): parse the cascade's readable content (or its
//! filtered DOM subtree) for outbound links and media, then upsert the
//! Domain/Expression/ExpressionLink/Media graph. Ported from
//! `crawler_engine.py`'s `_extract_links_from_markdown` /
//! `_extract_and_save_links` / `_extract_media_from_markdown` /
//! `_extract_and_save_media` pair.

use super::url_normalize::canonicalize;
use crate::core::types::{url_hash, Expression, MediaType};
use crate::extraction::cascade::ExtractedContent;
use crate::media;
use crate::repo;
use scraper::{Html, Selector};
use sqlx::SqlitePool;
use std::sync::OnceLock;
use url::Url;

#[derive(Debug, Default, Clone, Copy)]
pub struct DiscoveryOutcome {
    pub links_found: usize,
    pub media_found: usize,
}

/// Threaded through `discover` only when `ANALYZE_MEDIA` is enabled
/// (§4.7 "When inline analysis is enabled and type=image, invoke C4").
/// `None` leaves every discovered Media row `is_processed=false`.
#[derive(Clone, Copy)]
pub struct MediaAnalysisContext<'a> {
    pub http_client: &'a reqwest::Client,
    pub max_file_size_bytes: u64,
    pub n_dominant_colors: usize,
    pub compute_palette: bool,
}

struct LinkCandidate {
    anchor_text: String,
    href: String,
    rel: Option<String>,
}

struct MediaCandidate {
    url: String,
}

pub async fn discover(
    pool: &SqlitePool,
    source: &Expression,
    extracted: &ExtractedContent,
    media_ctx: Option<MediaAnalysisContext<'_>>,
) -> Result<DiscoveryOutcome, sqlx::Error> {
    let source_url = match Url::parse(&source.url) {
        Ok(u) => u,
        Err(_) => return Ok(DiscoveryOutcome::default()),
    };

    let (links, media) = match extracted.source_tag {
        "primary" | "archive" => {
            let markdown = extracted.readable.as_deref().unwrap_or_default();
            (markdown_links(markdown), markdown_media(markdown))
        }
        "heuristic_smart" | "heuristic_basic" => match &extracted.filtered_subtree_html {
            Some(html) => (dom_links(html), dom_media(html)),
            None => (Vec::new(), Vec::new()),
        },
        _ => (Vec::new(), Vec::new()),
    };

    let mut outcome = DiscoveryOutcome::default();

    for link in links {
        if save_link(pool, source, &source_url, &link).await? {
            outcome.links_found += 1;
        }
    }

    for media_ref in media {
        if save_media(pool, source, &source_url, &media_ref, media_ctx).await? {
            outcome.media_found += 1;
        }
    }

    Ok(outcome)
}

async fn save_link(
    pool: &SqlitePool,
    source: &Expression,
    source_url: &Url,
    link: &LinkCandidate,
) -> Result<bool, sqlx::Error> {
    let Some(clean_url) = canonicalize(source_url, &link.href) else {
        return Ok(false);
    };

    let Ok(target_parsed) = Url::parse(&clean_url) else {
        return Ok(false);
    };
    let Some(netloc) = target_parsed.host_str().map(str::to_lowercase) else {
        return Ok(false);
    };

    let domain = repo::domain::upsert(pool, source.land_id, &netloc).await?;
    let target_hash = url_hash(&clean_url);
    let target = repo::expression::create_if_absent(
        pool,
        source.land_id,
        domain.id,
        &clean_url,
        &target_hash,
        source.depth + 1,
    )
    .await?;

    if target.id == source.id {
        return Ok(false);
    }

    let source_host = source_url.host_str().unwrap_or_default().to_lowercase();
    let link_type = if netloc == source_host { "internal" } else { "external" };
    let anchor_text: String = link.anchor_text.chars().take(200).collect();

    repo::link::create_if_absent(
        pool,
        source.id,
        target.id,
        &anchor_text,
        link.rel.as_deref(),
        link_type,
    )
    .await?;

    Ok(true)
}

async fn save_media(
    pool: &SqlitePool,
    source: &Expression,
    source_url: &Url,
    media: &MediaCandidate,
    media_ctx: Option<MediaAnalysisContext<'_>>,
) -> Result<bool, sqlx::Error> {
    let Some(clean_url) = canonicalize(source_url, &media.url) else {
        return Ok(false);
    };

    let media_hash = url_hash(&clean_url);
    let media_type = infer_media_type(&clean_url);
    let row =
        repo::media::create_if_absent(pool, source.id, &clean_url, &media_hash, media_type.as_str()).await?;

    if let (MediaType::Image, Some(ctx)) = (media_type, media_ctx) {
        let analysis = media::analyze(
            ctx.http_client,
            &clean_url,
            ctx.max_file_size_bytes,
            ctx.n_dominant_colors,
            ctx.compute_palette,
        )
        .await;

        if let Some(error) = &analysis.error {
            repo::media::record_error(pool, row.id, error).await?;
        } else {
            repo::media::record_analysis(
                pool,
                row.id,
                analysis.width,
                analysis.height,
                analysis.format.as_deref(),
                analysis.color_mode.as_deref(),
                analysis.has_transparency,
                analysis.aspect_ratio,
                analysis.file_size,
                analysis.image_hash.as_deref(),
                analysis.mime_type.as_deref(),
                analysis.dominant_colors.as_deref(),
                analysis.web_safe_histogram.as_deref(),
                analysis.exif.as_ref(),
            )
            .await?;
        }
    }

    Ok(true)
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg", "avif", "tiff", "ico"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv", "m4v", "ogv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac", "opus"];

/// Extension-based heuristic (§4.7): unknown extensions default to image.
pub fn infer_media_type(url: &str) -> MediaType {
    let ext = Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments().and_then(|mut s| s.next_back().map(str::to_string)))
        .and_then(|last| last.rsplit('.').next().map(str::to_lowercase))
        .unwrap_or_default();

    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        MediaType::Video
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        MediaType::Audio
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        MediaType::Image
    } else {
        MediaType::Image
    }
}

fn md_link_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"(?:[^!]|^)\[([^\]]*)\]\(([^)]+)\)").unwrap())
}

fn markdown_links(markdown: &str) -> Vec<LinkCandidate> {
    md_link_re()
        .captures_iter(markdown)
        .filter_map(|c| {
            let href = c.get(2)?.as_str().trim().to_string();
            let text = c.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
            Some(LinkCandidate {
                anchor_text: if text.is_empty() { "No text".to_string() } else { text },
                href,
                rel: None,
            })
        })
        .collect()
}

fn md_image_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").unwrap())
}

fn md_video_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\[VIDEO:\s*([^\]]+)\]").unwrap())
}

fn md_audio_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\[AUDIO:\s*([^\]]+)\]").unwrap())
}

fn markdown_media(markdown: &str) -> Vec<MediaCandidate> {
    let mut out = Vec::new();
    for re in [md_image_re(), md_video_re(), md_audio_re()] {
        for cap in re.captures_iter(markdown) {
            let url = cap[1].trim().to_string();
            if !url.starts_with("data:") {
                out.push(MediaCandidate { url });
            }
        }
    }
    out
}

fn dom_links(html: &str) -> Vec<LinkCandidate> {
    let document = Html::parse_document(html);
    let Ok(sel) = Selector::parse("a[href]") else { return Vec::new() };
    document
        .select(&sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim().to_string();
            if href.is_empty() {
                return None;
            }
            let anchor_text = el.text().collect::<String>().trim().to_string();
            Some(LinkCandidate {
                anchor_text: if anchor_text.is_empty() { "No text".to_string() } else { anchor_text },
                href,
                rel: el.value().attr("rel").map(str::to_string),
            })
        })
        .collect()
}

const MEDIA_SRC_ATTRS: &[&str] = &["src", "data-src", "data-original", "srcset"];

fn dom_media(html: &str) -> Vec<MediaCandidate> {
    let document = Html::parse_document(html);
    let Ok(sel) = Selector::parse("img, video, audio, source") else { return Vec::new() };

    let mut out = Vec::new();
    for el in document.select(&sel) {
        for attr in MEDIA_SRC_ATTRS {
            if let Some(value) = el.value().attr(attr) {
                let first = value.split(',').next().unwrap_or(value).split_whitespace().next().unwrap_or(value);
                if !first.is_empty() && !first.starts_with("data:") {
                    out.push(MediaCandidate { url: first.to_string() });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_video_and_audio_and_defaults_to_image() {
        assert!(matches!(infer_media_type("https://e.com/a.mp4"), MediaType::Video));
        assert!(matches!(infer_media_type("https://e.com/a.mp3"), MediaType::Audio));
        assert!(matches!(infer_media_type("https://e.com/a.jpg"), MediaType::Image));
        assert!(matches!(infer_media_type("https://e.com/unknown"), MediaType::Image));
    }

    #[test]
    fn markdown_links_skip_image_markers() {
        let md = "See [docs](https://e.com/docs) and ![pic](https://e.com/a.jpg)";
        let links = markdown_links(md);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://e.com/docs");
        assert_eq!(links[0].anchor_text, "docs");
    }

    #[test]
    fn dom_links_capture_rel_and_text() {
        let html = r#"<a href="/a" rel="nofollow">Go here</a>"#;
        let links = dom_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].anchor_text, "Go here");
        assert_eq!(links[0].rel.as_deref(), Some("nofollow"));
    }
}
