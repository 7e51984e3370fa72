//! Media enrichment for the extraction cascade (§4.3): after a
//! successful primary/archive rung, walk the readable HTML and append
//! markdown lines for every `<img>`/`<video>`/`<audio>` source so the
//! Link/Media Graph Builder (C7) can later harvest them with a plain
//! markdown scan, whether the source was markdown to begin with or not.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Append `![IMAGE](url)` / `[VIDEO: url]` / `[AUDIO: url]` lines for
/// every media source found in `readable_html`, resolved against
/// `crawl_url` (never the archive URL, even on the archival rung).
/// Already-present `![...](...)` markdown image references are left
/// alone but counted for de-duplication.
pub fn enrich_with_media_markers(markdown: &str, readable_html: &str, crawl_url: &Url) -> String {
    let document = Html::parse_document(readable_html);
    let mut seen: HashSet<String> = existing_markdown_image_urls(markdown).into_iter().collect();
    let mut lines = Vec::new();

    if let Ok(sel) = Selector::parse("img[src]") {
        for el in document.select(&sel) {
            if let Some(src) = el.value().attr("src") {
                if let Some(resolved) = resolve(crawl_url, src) {
                    if seen.insert(resolved.clone()) {
                        lines.push(format!("![IMAGE]({})", resolved));
                    }
                }
            }
        }
    }

    if let Ok(sel) = Selector::parse("video[src], video source[src]") {
        for el in document.select(&sel) {
            if let Some(src) = el.value().attr("src") {
                if let Some(resolved) = resolve(crawl_url, src) {
                    if seen.insert(resolved.clone()) {
                        lines.push(format!("[VIDEO: {}]", resolved));
                    }
                }
            }
        }
    }

    if let Ok(sel) = Selector::parse("audio[src], audio source[src]") {
        for el in document.select(&sel) {
            if let Some(src) = el.value().attr("src") {
                if let Some(resolved) = resolve(crawl_url, src) {
                    if seen.insert(resolved.clone()) {
                        lines.push(format!("[AUDIO: {}]", resolved));
                    }
                }
            }
        }
    }

    if lines.is_empty() {
        markdown.to_string()
    } else {
        format!("{}\n\n{}", markdown, lines.join("\n"))
    }
}

fn resolve(base: &Url, src: &str) -> Option<String> {
    if src.starts_with("data:") {
        return None;
    }
    base.join(src).ok().map(|u| u.to_string())
}

fn existing_markdown_image_urls(markdown: &str) -> Vec<String> {
    let re = image_markdown_re();
    re.captures_iter(markdown)
        .filter_map(|c| c.get(2).map(|m| m.as_str().trim().to_string()))
        .collect()
}

fn image_markdown_re() -> &'static regex::Regex {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_image_and_video_markers() {
        let html = r#"<div><img src="/a.jpg"><video src="movie.mp4"></video></div>"#;
        let base = Url::parse("https://example.com/page").unwrap();
        let out = enrich_with_media_markers("body text", html, &base);
        assert!(out.contains("![IMAGE](https://example.com/a.jpg)"));
        assert!(out.contains("[VIDEO: https://example.com/movie.mp4]"));
    }

    #[test]
    fn skips_data_urls() {
        let html = r#"<img src="data:image/png;base64,abc">"#;
        let base = Url::parse("https://example.com").unwrap();
        let out = enrich_with_media_markers("body", html, &base);
        assert_eq!(out, "body");
    }

    #[test]
    fn does_not_duplicate_images_already_in_markdown() {
        let markdown = "![alt](https://example.com/a.jpg)";
        let html = r#"<img src="/a.jpg">"#;
        let base = Url::parse("https://example.com/page").unwrap();
        let out = enrich_with_media_markers(markdown, html, &base);
        assert_eq!(out.matches("a.jpg").count(), 1);
    }
}
