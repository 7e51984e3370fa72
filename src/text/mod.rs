//! Text Normalizer (C1): tokenize, stem/lemmatize, extract keywords,
//! detect language. Pure, deterministic, no I/O — the lazily-initialized
//! stemmer singletons are the only shared state (§9 "global mutable state").

pub mod lang_detect;
pub mod lemma;
pub mod normalize;
pub mod similarity;
pub mod tokenize;

pub use lang_detect::detect_language;
pub use lemma::lemma;
pub use normalize::normalize_text;
pub use similarity::jaccard_similarity;
pub use tokenize::tokenize;

/// French stopwords plus the additional entries the original pipeline
/// carried beyond NLTK's base list.
const STOPWORDS_FR: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "de", "du", "et", "ou", "mais", "donc", "or", "ni",
    "car", "ce", "ces", "cet", "cette", "il", "elle", "ils", "elles", "nous", "vous", "je", "tu",
    "on", "qui", "que", "quoi", "dont", "où", "pour", "par", "avec", "sans", "sur", "sous",
    "dans", "entre", "vers", "chez", "depuis", "pendant", "avant", "après", "est", "sont", "être",
    "avoir", "fait", "faire", "plus", "moins", "très", "aussi", "comme", "donc", "alors", "ainsi",
    "cela", "celui", "celle", "ceux", "celles", "ça", "leur", "leurs", "son", "sa", "ses", "mon",
    "ma", "mes", "ton", "ta", "tes", "au", "aux", "se", "s", "l", "d", "n",
];

const STOPWORDS_EN: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "so", "nor", "for", "this", "that", "these", "those",
    "he", "she", "it", "they", "we", "you", "i", "who", "what", "which", "whom", "where", "to",
    "of", "in", "on", "with", "without", "by", "from", "into", "between", "during", "before",
    "after", "is", "are", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "more", "most", "less", "least", "very", "also", "as", "so", "than", "then", "there", "here",
    "their", "his", "her", "its", "my", "your", "our",
];

pub fn stopwords(lang: &str) -> &'static [&'static str] {
    match lang {
        "fr" => STOPWORDS_FR,
        "en" => STOPWORDS_EN,
        _ => &[],
    }
}

/// `keywords(text, lang, k)` — tokenize, drop stopwords and sub-3-char
/// tokens, map each surviving token to its lemma, keep the first `k`
/// distinct lemmas preserving first-seen order (§4.1).
pub fn keywords(text: &str, lang: &str, max_keywords: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let stop = stopwords(lang);
    let normalized = normalize_text(text);
    let tokens = tokenize(&normalized.to_lowercase(), lang);

    let mut out = Vec::with_capacity(max_keywords.min(tokens.len()));
    for token in tokens {
        if token.chars().count() < 3 {
            continue;
        }
        if !token.chars().all(|c| c.is_alphanumeric()) {
            continue;
        }
        if stop.contains(&token.as_str()) {
            continue;
        }
        let l = lemma(&token, lang);
        if l.is_empty() {
            continue;
        }
        if !out.contains(&l) {
            out.push(l);
        }
        if out.len() >= max_keywords {
            break;
        }
    }
    out
}
