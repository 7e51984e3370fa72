use crate::text::detect_language as detect_language_from_text;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use url::Url;

/// All of the page-level metadata the extraction cascade attaches to an
/// Expression, independent of which content rung produced the body
/// (§4.3 step 2).
#[derive(Debug, Clone, Default)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub canonical_url: Option<String>,
    pub language: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

fn text_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let content = document.select(&sel).next()?.value().attr(attr)?.trim().to_string();
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

/// `og:title` -> `twitter:title` -> `<title>` then `<h1>` fallback (the
/// `<title>`/`<h1>` half of §4.3's title chain; the primary-extractor
/// and URL rungs are layered on top by the cascade).
fn extract_title(document: &Html) -> Option<String> {
    if let Some(t) = text_attr(document, "meta[property=\"og:title\"]", "content") {
        return Some(t);
    }
    if let Some(t) = text_attr(document, "meta[name=\"twitter:title\"]", "content") {
        return Some(t);
    }
    if let Ok(sel) = Selector::parse("title") {
        if let Some(el) = document.select(&sel).next() {
            let t = el.text().collect::<String>().trim().to_string();
            if !t.is_empty() {
                return Some(t);
            }
        }
    }
    if let Ok(sel) = Selector::parse("h1") {
        if let Some(el) = document.select(&sel).next() {
            let t = el.text().collect::<String>().trim().to_string();
            if !t.is_empty() {
                return Some(t);
            }
        }
    }
    None
}

/// `og:description` -> `twitter:description` -> `meta[name=description]`
/// (§4.3's description chain, minus the primary-extractor rung).
fn extract_description(document: &Html) -> Option<String> {
    text_attr(document, "meta[property=\"og:description\"]", "content")
        .or_else(|| text_attr(document, "meta[name=\"twitter:description\"]", "content"))
        .or_else(|| text_attr(document, "meta[name=\"description\"]", "content"))
}

fn extract_keywords(document: &Html) -> Option<String> {
    text_attr(document, "meta[name=\"keywords\"]", "content")
}

/// `link[rel=canonical]` then `og:url` (§4.3's canonical chain).
fn extract_canonical(document: &Html, base: &Url) -> Option<String> {
    if let Some(href) = text_attr(document, "link[rel=\"canonical\"]", "href") {
        return Some(base.join(&href).map(|u| u.to_string()).unwrap_or(href));
    }
    text_attr(document, "meta[property=\"og:url\"]", "content")
}

/// `article:published_time` -> Schema.org `datePublished` -> `dc.date`
/// -> `<meta name=date>` -> `<meta name=published_time>` (§4.3's
/// published-at chain, minus the primary-extractor rung).
fn extract_published_time(document: &Html) -> Option<DateTime<Utc>> {
    let raw = text_attr(document, "meta[property=\"article:published_time\"]", "content")
        .or_else(|| text_attr(document, "meta[itemprop=\"datePublished\"]", "content"))
        .or_else(|| text_attr(document, "meta[name=\"dc.date\"]", "content"))
        .or_else(|| text_attr(document, "meta[name=\"date\"]", "content"))
        .or_else(|| text_attr(document, "meta[name=\"published_time\"]", "content"))?;
    parse_flexible_date(&raw)
}

fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

/// `html[lang]` -> `meta[http-equiv=content-language]` -> content-based
/// detection (§4.9's same 4-rung chain, minus the `html[lang]` step
/// being an attribute rather than a meta tag).
fn detect_language(document: &Html, html: &str) -> Option<String> {
    if let Some(lang) = text_attr(document, "html", "lang") {
        return Some(lang);
    }
    if let Some(lang) = text_attr(document, "meta[http-equiv=\"content-language\"]", "content") {
        return Some(lang);
    }
    detect_language_from_text(html)
}

pub fn extract_page_metadata(html: &str, base: &Url) -> PageMetadata {
    let document = Html::parse_document(html);
    PageMetadata {
        title: extract_title(&document),
        description: extract_description(&document),
        keywords: extract_keywords(&document),
        canonical_url: extract_canonical(&document, base),
        language: detect_language(&document, html),
        published_at: extract_published_time(&document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_falls_back_to_h1() {
        let html = "<html><body><h1>Fallback Title</h1></body></html>";
        let base = Url::parse("https://example.com").unwrap();
        let meta = extract_page_metadata(html, &base);
        assert_eq!(meta.title.as_deref(), Some("Fallback Title"));
    }

    #[test]
    fn og_title_wins_over_title_tag() {
        let html = r#"<html><head>
            <title>Home | Site</title>
            <meta property="og:title" content="The Real Article Title">
        </head></html>"#;
        let base = Url::parse("https://example.com").unwrap();
        let meta = extract_page_metadata(html, &base);
        assert_eq!(meta.title.as_deref(), Some("The Real Article Title"));
    }

    #[test]
    fn og_description_wins_over_meta_description() {
        let html = r#"<html><head>
            <meta name="description" content="Generic site description">
            <meta property="og:description" content="Specific article description">
        </head></html>"#;
        let base = Url::parse("https://example.com").unwrap();
        let meta = extract_page_metadata(html, &base);
        assert_eq!(meta.description.as_deref(), Some("Specific article description"));
    }

    #[test]
    fn canonical_resolves_relative_href() {
        let html = r#"<html><head><link rel="canonical" href="/a/b"></head></html>"#;
        let base = Url::parse("https://example.com/x").unwrap();
        let meta = extract_page_metadata(html, &base);
        assert_eq!(meta.canonical_url.as_deref(), Some("https://example.com/a/b"));
    }

    #[test]
    fn html_lang_attribute_wins_over_content_detection() {
        let html = r#"<html lang="fr"><body><p>some text</p></body></html>"#;
        let base = Url::parse("https://example.com").unwrap();
        let meta = extract_page_metadata(html, &base);
        assert_eq!(meta.language.as_deref(), Some("fr"));
    }
}
