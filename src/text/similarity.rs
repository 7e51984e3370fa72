use std::collections::HashSet;

/// Jaccard similarity over two keyword sets: |A∩B| / |A∪B|, 0.0 when
/// both sets are empty (§2 supplemented feature, carried from
/// `calculate_text_similarity`).
pub fn jaccard_similarity(a: &[String], b: &[String]) -> f64 {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();

    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn identical_sets_score_one() {
        let a = v(&["chat", "chien"]);
        assert_eq!(jaccard_similarity(&a, &a), 1.0);
    }

    #[test]
    fn disjoint_sets_score_zero() {
        let a = v(&["chat"]);
        let b = v(&["voiture"]);
        assert_eq!(jaccard_similarity(&a, &b), 0.0);
    }

    #[test]
    fn both_empty_scores_zero() {
        assert_eq!(jaccard_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn partial_overlap() {
        let a = v(&["chat", "chien", "oiseau"]);
        let b = v(&["chat", "chien", "poisson"]);
        assert_eq!(jaccard_similarity(&a, &b), 0.5);
    }
}
