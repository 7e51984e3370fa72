use crate::text::keywords;
use std::collections::{HashMap, HashSet};

const MAX_TITLE_KEYWORDS: usize = 20;
const MAX_CONTENT_KEYWORDS: usize = 50;
const TITLE_WEIGHT: f64 = 10.0;
const CONTENT_WEIGHT: f64 = 1.0;
const MULTI_TERM_BONUS: f64 = 0.5;
const FRENCH_MULTIPLIER: f64 = 1.1;

/// Score an Expression's title/content against a Land's dictionary
/// (lemma -> weight). Each matched lemma contributes its own weight,
/// not a flat constant: title hits count `weight * 10`, content hits
/// `weight * 1`. Matching on more than one distinct dictionary term
/// adds a flat bonus per extra term; French content gets a 10% boost
/// once it has any match at all (§4.5, ported from `expression_relevance`).
///
/// An empty dictionary always scores 0.0 — there is nothing to match.
pub fn expression_relevance(
    title: Option<&str>,
    content: Option<&str>,
    lang: &str,
    dictionary: &HashMap<String, f64>,
) -> f64 {
    if dictionary.is_empty() {
        return 0.0;
    }

    let mut matched_terms: HashSet<String> = HashSet::new();
    let mut score = 0.0;

    if let Some(title) = title {
        for kw in keywords(title, lang, MAX_TITLE_KEYWORDS) {
            if matched_terms.contains(&kw) {
                continue;
            }
            if let Some(weight) = dictionary.get(&kw) {
                score += weight * TITLE_WEIGHT;
                matched_terms.insert(kw);
            }
        }
    }

    if let Some(content) = content {
        for kw in keywords(content, lang, MAX_CONTENT_KEYWORDS) {
            if matched_terms.contains(&kw) {
                continue;
            }
            if let Some(weight) = dictionary.get(&kw) {
                score += weight * CONTENT_WEIGHT;
                matched_terms.insert(kw);
            }
        }
    }

    if matched_terms.len() > 1 {
        score += MULTI_TERM_BONUS * matched_terms.len() as f64;
    }

    if lang == "fr" && !matched_terms.is_empty() {
        score *= FRENCH_MULTIPLIER;
    }

    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(w, weight)| (w.to_string(), *weight)).collect()
    }

    #[test]
    fn empty_dictionary_is_always_zero() {
        assert_eq!(
            expression_relevance(Some("chat"), Some("chat chien"), "fr", &HashMap::new()),
            0.0
        );
    }

    #[test]
    fn title_match_outweighs_content_match() {
        let d = dict(&[("chat", 1.0)]);
        let title_hit = expression_relevance(Some("chat"), None, "en", &d);
        let content_hit = expression_relevance(None, Some("chat"), "en", &d);
        assert!(title_hit > content_hit);
    }

    #[test]
    fn weight_scales_the_score_linearly() {
        let light = dict(&[("chat", 1.0)]);
        let heavy = dict(&[("chat", 3.0)]);
        let light_score = expression_relevance(Some("chat"), None, "en", &light);
        let heavy_score = expression_relevance(Some("chat"), None, "en", &heavy);
        assert!((heavy_score - light_score * 3.0).abs() < 1e-9);
    }

    #[test]
    fn french_gets_a_boost_once_matched() {
        let d = dict(&[("chat", 1.0)]);
        let fr = expression_relevance(Some("chat"), None, "fr", &d);
        let en = expression_relevance(Some("chat"), None, "en", &d);
        assert!(fr > en);
    }

    #[test]
    fn no_match_scores_zero() {
        let d = dict(&[("chat", 1.0)]);
        assert_eq!(
            expression_relevance(Some("voiture"), Some("voiture rouge"), "en", &d),
            0.0
        );
    }
}
