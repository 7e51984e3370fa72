use super::STOPWORDS_FR;
use whatlang::{detect, Lang};

const MIN_DETECTABLE_CHARS: usize = 10;
/// Below this, even the stop-word/accent fallback gives up rather than
/// guess (§4.1 "return null only for very short or unreadable input").
const MIN_SUBSTANTIAL_CHARS: usize = 20;

/// Content-based language detection on plain text (§4.1, used when no
/// `html[lang]`/meta hint is available). The HTML-attribute-first chain
/// lives with the extraction cascade, which calls this as its last rung.
///
/// Tries the statistical detector on text of at least
/// [`MIN_DETECTABLE_CHARS`]; below that, or when it returns nothing, falls
/// back to a French accent/stopword heuristic for "substantial" text,
/// defaulting to `en` when neither signal fires. Very short input is the
/// only case that returns `None`.
pub fn detect_language(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_DETECTABLE_CHARS {
        return heuristic_fallback(trimmed);
    }

    if let Some(info) = detect(trimmed) {
        return Some(match info.lang() {
            Lang::Eng => "en".to_string(),
            Lang::Spa => "es".to_string(),
            Lang::Fra => "fr".to_string(),
            Lang::Deu => "de".to_string(),
            Lang::Ita => "it".to_string(),
            Lang::Por => "pt".to_string(),
            Lang::Rus => "ru".to_string(),
            Lang::Jpn => "ja".to_string(),
            Lang::Kor => "ko".to_string(),
            Lang::Cmn => "zh".to_string(),
            other => format!("{other:?}").to_lowercase(),
        });
    }

    heuristic_fallback(trimmed)
}

/// French accent/stopword heuristic, last-resort defaulting to `en` for
/// substantial text (§4.1). Returns `None` for anything too short to
/// carry a meaningful signal either way.
fn heuristic_fallback(text: &str) -> Option<String> {
    if text.chars().count() < MIN_SUBSTANTIAL_CHARS {
        return None;
    }

    let lower = text.to_lowercase();
    let has_french_accent = lower.chars().any(|c| "àâäéèêëîïôöùûüçœ".contains(c));
    let french_stopword_hits = lower
        .split_whitespace()
        .filter(|w| STOPWORDS_FR.contains(w))
        .count();

    if has_french_accent || french_stopword_hits >= 2 {
        Some("fr".to_string())
    } else {
        Some("en".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_french_text() {
        let sample = "Le chat est assis sur le tapis et regarde par la fenêtre avec attention.";
        assert_eq!(detect_language(sample).as_deref(), Some("fr"));
    }

    #[test]
    fn empty_text_detects_nothing() {
        assert_eq!(detect_language(""), None);
    }
}
