use regex::Regex;
use std::sync::OnceLock;

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-zÀ-ÖØ-öø-ÿ]+").unwrap())
}

/// Fallback tokenizer used for every language: a simple run of
/// (accented) alphabetic characters. The corpus distribution the
/// original pipeline shipped with pulls in a full sentence/word
/// tokenizer for a handful of languages; we keep the one rule that
/// actually governs keyword extraction everywhere (§4.1).
pub fn tokenize(text: &str, _lang: &str) -> Vec<String> {
    word_re().find_iter(text).map(|m| m.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_non_alphabetic_runs() {
        assert_eq!(
            tokenize("l'été, chaud-2024!", "fr"),
            vec!["l", "été", "chaud"]
        );
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(tokenize("", "en").is_empty());
    }
}
