//! Primary extractor rung (§4.3 step 1): readability over the given
//! HTML, rendered to markdown, ported from `extract_clean_content`'s
//! readability pass.

use super::heuristic::{post_clean_text, preprocess_html};
use super::metadata::{extract_page_metadata, PageMetadata};
use url::Url;

pub struct PrimaryResult {
    pub readable: String,
    pub readable_html: String,
    pub metadata: PageMetadata,
}

/// Run readability over `html`, render its cleaned content to markdown
/// with `html2md`, and pull page metadata from the original document.
/// Returns `None` if readability can't find an article body at all.
pub fn extract(html: &str, base_url: &Url) -> Option<PrimaryResult> {
    let pre = preprocess_html(html);
    let product = readability::extractor::extract(&mut pre.as_bytes(), base_url).ok()?;

    let readable_html = product.content.clone();
    let readable = post_clean_text(&html2md::parse_html(&readable_html));
    let metadata = extract_page_metadata(html, base_url);

    Some(PrimaryResult {
        readable,
        readable_html,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_an_article_body() {
        let html = r#"<html><head><title>A Title</title></head>
            <body><nav>skip this</nav>
            <article><p>This is the real article body with enough words to pass readability's own internal heuristics, repeated so it clears the threshold comfortably across several sentences of filler text.</p></article>
            </body></html>"#;
        let base = Url::parse("https://example.com/article").unwrap();
        let result = extract(html, &base);
        assert!(result.is_some());
        let result = result.unwrap();
        assert!(result.readable.contains("real article body"));
        assert!(!result.readable.to_lowercase().contains("skip this"));
    }

    #[test]
    fn empty_document_yields_none_or_tiny_output() {
        let html = "<html><body></body></html>";
        let base = Url::parse("https://example.com").unwrap();
        match extract(html, &base) {
            None => {}
            Some(r) => assert!(r.readable.len() < 100),
        }
    }
}
