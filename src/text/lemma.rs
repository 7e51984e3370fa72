use rust_stemmers::{Algorithm, Stemmer};
use std::sync::OnceLock;

fn french_stemmer() -> &'static Stemmer {
    static S: OnceLock<Stemmer> = OnceLock::new();
    S.get_or_init(|| Stemmer::create(Algorithm::French))
}

fn english_stemmer() -> &'static Stemmer {
    static S: OnceLock<Stemmer> = OnceLock::new();
    S.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Reduce a single lowercase token to its canonical dictionary form
/// (§4.1, §4.2 "lemma" column on `words`). French and English route
/// through a Snowball stemmer; anything else is lowercased only — the
/// original pipeline's WordNet lemmatizer-then-stem-if-unchanged chain
/// for English collapses to a single stem pass here, since a bare stem
/// is itself a stable lookup key for dictionary matching.
pub fn lemma(token: &str, lang: &str) -> String {
    let lower = token.to_lowercase();
    if lower.is_empty() {
        return lower;
    }

    match lang {
        "fr" => french_stemmer().stem(&lower).to_string(),
        "en" => english_stemmer().stem(&lower).to_string(),
        _ => lower.chars().filter(|c| c.is_alphanumeric()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_plural_collapses_to_singular_stem() {
        assert_eq!(lemma("chats", "fr"), lemma("chat", "fr"));
    }

    #[test]
    fn english_verb_forms_share_a_stem() {
        assert_eq!(lemma("running", "en"), lemma("runs", "en"));
    }

    #[test]
    fn unknown_language_only_lowercases() {
        assert_eq!(lemma("Xyz123", "de"), "xyz123");
    }
}
