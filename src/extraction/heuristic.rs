use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

const NOISE_IDENTIFIERS: &[&str] = &[
    "ads",
    "advert",
    "adsense",
    "adunit",
    "ad-slot",
    "ad_container",
    "adbox",
    "sponsor",
    "promo",
    "cookie",
    "consent",
    "banner",
    "modal",
    "subscribe",
    "newsletter",
    "share",
    "social",
    "sidebar",
    "comments",
    "related",
    "breadcrumb",
    "pagination",
    "nav",
    "footer",
    "header",
    "hero",
    "toolbar",
];

const MAIN_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=main]",
    "[itemprop=articleBody]",
    ".entry-content",
    ".post-content",
    ".article-content",
    "#content",
    "#main",
    ".content",
    ".post",
    ".article",
];

const BASIC_SELECTORS: &[&str] = &["article", "main", ".content", ".post-body", "#main", ".entry-content"];

fn block_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?is)<(?:script|style|noscript|svg|canvas|iframe)[^>]*?>.*?</(?:script|style|noscript|svg|canvas|iframe)>",
        )
        .unwrap()
    })
}

fn structural_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(?:nav|header|footer|aside)[^>]*?>.*?</(?:nav|header|footer|aside)>").unwrap()
    })
}

fn interactive_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(?:form|button)[^>]*?>.*?</(?:form|button)>").unwrap())
}

fn hidden_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<[^>]*?(?:display:\s*none|visibility:\s*hidden|aria-hidden="true")[^>]*?>.*?</[^>]+>"#,
        )
        .unwrap()
    })
}

fn ad_block_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<(?:div|section|article)[^>]*?(?:id|class)=(?:'|")[^'">]*(?:ads|advert|sponsor|promo|related|cookie|banner|modal|subscribe|newsletter|share|social|sidebar|comments|breadcrumb|pagination)[^'">]*(?:'|")[^>]*?>.*?</(?:div|section|article)>"#,
        )
        .unwrap()
    })
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn newline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").unwrap())
}

fn garbage_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            &[
                r"(?i)^subscribe$",
                r"(?i)^sign up$",
                r"(?i)^cookie",
                r"(?i)^accept all$",
                r"(?i)^advert",
                r"(?i)^sponsor",
                r"(?i)^newsletter$",
                r"(?i)^related articles",
                r"(?i)^comments?$",
                r"(?i)^read more$",
                r"(?i)^continue reading$",
            ]
            .join("|"),
        )
        .unwrap()
    })
}

fn multi_newline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

/// Strip script/style/nav/header/footer/aside/forms/buttons/hidden
/// elements and ad-identified blocks before any DOM walk (§4.3 step 1,
/// ported from `preprocess_html`).
pub fn preprocess_html(html: &str) -> String {
    let mut s = block_strip_re().replace_all(html, " ").to_string();
    s = structural_strip_re().replace_all(&s, " ").to_string();
    s = interactive_strip_re().replace_all(&s, " ").to_string();
    s = hidden_strip_re().replace_all(&s, " ").to_string();
    s = ad_block_strip_re().replace_all(&s, " ").to_string();
    s
}

pub fn is_noise_identifier(ident: &str) -> bool {
    let ident = ident.to_ascii_lowercase();
    if NOISE_IDENTIFIERS.iter().any(|n| ident.contains(n)) {
        return true;
    }
    ident.contains("-ad") || ident.contains("ad-") || ident.contains("_ad") || ident.contains("ad_")
}

fn extract_text_recursive(element: &ElementRef, text_parts: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let tag_name = child_element.value().name();
            if matches!(
                tag_name,
                "script" | "style" | "noscript" | "svg" | "canvas" | "iframe" | "form" | "header"
                    | "footer" | "nav" | "aside"
            ) {
                continue;
            }

            let attrs = child_element.value();
            let mut skip = false;
            if let Some(id) = attrs.id() {
                skip |= is_noise_identifier(id);
            }
            for class in attrs.classes() {
                if is_noise_identifier(class) {
                    skip = true;
                    break;
                }
            }
            if skip {
                continue;
            }
            extract_text_recursive(&child_element, text_parts);
        } else if let Some(text_node) = child.value().as_text() {
            text_parts.push(text_node.text.to_string());
        }
    }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn clean_text(text: &str) -> String {
    let cleaned = whitespace_re().replace_all(text, " ");
    let cleaned = newline_re().replace_all(&cleaned, "\n\n");
    cleaned.trim().to_string()
}

/// Drop boilerplate lines (cookie banners, share prompts, etc.) after
/// the main text has been assembled (§4.3 step 5).
pub fn post_clean_text(text: &str) -> String {
    let out = clean_text(text);

    let mut kept = Vec::new();
    for line in out.split('\n') {
        let line_trim = line.trim();
        if line_trim.is_empty() || line_trim.len() < 2 {
            continue;
        }
        if garbage_line_re().is_match(line_trim) {
            continue;
        }
        kept.push(line_trim.to_string());
    }
    kept.dedup();

    let result = kept.join("\n");
    multi_newline_re().replace_all(&result, "\n\n").to_string()
}

/// Noise-ratio heuristic: more than 60% short noise-keyword lines, or an
/// average line length under 20 chars (§4.3 "high-noise gate").
pub fn is_high_noise_content(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 10 {
        return false;
    }

    let noise_keywords = [
        "share", "upvote", "downvote", "comment", "reply", "login", "sign up", "subscribe",
        "follow", "like", "tweet", "retweet", "menu", "navigation",
    ];
    let mut noise_lines = 0;
    let mut total_chars = 0;

    for line in &lines {
        let trimmed = line.trim();
        if trimmed.len() < 10 {
            noise_lines += 1;
            continue;
        }
        total_chars += trimmed.len();

        let lower = trimmed.to_lowercase();
        if noise_keywords.iter().any(|kw| lower.contains(kw)) && trimmed.len() < 40 {
            noise_lines += 1;
        }
    }

    let noise_ratio = noise_lines as f64 / lines.len() as f64;
    let avg_line_length = if !lines.is_empty() { total_chars / lines.len() } else { 0 };

    noise_ratio > 0.6 || avg_line_length < 20
}

/// The "smart" heuristic rung: walk a priority list of content selectors
/// and keep whichever match yields the most words (§4.3 step 3, ported
/// from `heuristic_main_extraction`).
pub fn smart_main_extraction(html: &str) -> String {
    smart_main_extraction_with_subtree(html).0
}

/// Same selection as [`smart_main_extraction`], but also returns the
/// matched element's own HTML so C7 can walk it for links/media
/// without re-parsing the whole page (§4.7 "filtered DOM subtree").
pub fn smart_main_extraction_with_subtree(html: &str) -> (String, Option<String>) {
    let document = Html::parse_document(html);

    let mut best_text = String::new();
    let mut best_html: Option<String> = None;
    let mut best_words = 0usize;

    for sel_str in MAIN_SELECTORS {
        if let Ok(sel) = Selector::parse(sel_str) {
            for el in document.select(&sel) {
                let mut parts = Vec::new();
                extract_text_recursive(&el, &mut parts);
                let text = parts.join(" ");
                let cleaned = clean_text(&text);
                let wc = count_words(&cleaned);
                if wc > best_words {
                    best_words = wc;
                    best_text = cleaned;
                    best_html = Some(el.html());
                }
            }
        }
    }

    (best_text, best_html)
}

/// The "basic" fallback rung: first selector match over 50 words, else
/// all `<p>` tags over 30 chars concatenated (§4.3 step 4, ported from
/// `text_only_extraction`).
pub fn basic_extraction(html: &str) -> String {
    basic_extraction_with_subtree(html).0
}

/// Same selection as [`basic_extraction`], plus the matched element's
/// own HTML (or `None` when it fell back to the whole-document
/// paragraph scrape, which has no single subtree to walk).
pub fn basic_extraction_with_subtree(html: &str) -> (String, Option<String>) {
    let document = Html::parse_document(html);

    for sel_str in BASIC_SELECTORS {
        if let Ok(selector) = Selector::parse(sel_str) {
            for element in document.select(&selector) {
                let mut parts = Vec::new();
                extract_text_recursive(&element, &mut parts);
                let text = parts.join(" ");
                let cleaned = clean_text(&text);
                if count_words(&cleaned) > 50 {
                    return (cleaned, Some(element.html()));
                }
            }
        }
    }

    let mut paragraphs = Vec::new();
    if let Ok(p_selector) = Selector::parse("p") {
        for element in document.select(&p_selector) {
            let text = element.text().collect::<String>().trim().to_string();
            if text.len() > 30 {
                paragraphs.push(text);
            }
        }
    }

    (clean_text(&paragraphs.join("\n\n")), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_strips_script_and_nav() {
        let html = "<html><body><script>evil()</script><nav>menu</nav><p>real text</p></body></html>";
        let out = preprocess_html(html);
        assert!(!out.contains("evil"));
        assert!(!out.contains("menu"));
        assert!(out.contains("real text"));
    }

    #[test]
    fn noise_identifier_matches_ad_variants() {
        assert!(is_noise_identifier("sidebar-widget"));
        assert!(is_noise_identifier("post-ad-slot"));
        assert!(!is_noise_identifier("main-article"));
    }

    #[test]
    fn smart_extraction_prefers_the_article_tag() {
        let html = "<html><body><nav>skip</nav><article><p>one two three four five six seven</p></article></body></html>";
        let out = smart_main_extraction(html);
        assert!(out.contains("one two three"));
    }

    #[test]
    fn post_clean_drops_boilerplate_lines() {
        let input = "Real paragraph here.\nSubscribe\nAnother real line.";
        let out = post_clean_text(input);
        assert!(!out.to_lowercase().contains("subscribe"));
        assert!(out.contains("Real paragraph here."));
    }
}
