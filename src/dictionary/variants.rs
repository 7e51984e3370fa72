/// Morphological variant generation for dictionary seeding (§4.2,
/// ported from `_get_word_variations`). Purely syntactic — no
/// dictionary lookups, so it is safe to call before a word even exists.
pub fn word_variations(word: &str, lang: &str) -> Vec<String> {
    let w = word.to_lowercase();
    let mut out = Vec::new();

    match lang {
        "fr" => french_variations(&w, &mut out),
        "en" => english_variations(&w, &mut out),
        _ => {}
    }

    out.retain(|v| v != &w && !v.is_empty());
    out.dedup();
    out
}

fn french_variations(w: &str, out: &mut Vec<String>) {
    // Gender: drop a trailing 'e' (e.g. "grande" -> "grand").
    if let Some(stripped) = w.strip_suffix('e') {
        if stripped.len() >= 2 {
            out.push(stripped.to_string());
        }
    }

    // Number: pluralize with 's', and the double-s family for '-es' endings.
    out.push(format!("{w}s"));
    if let Some(stripped) = w.strip_suffix("es") {
        out.push(stripped.to_string());
        out.push(format!("{stripped}e"));
    }

    // -er verb conjugation family.
    if let Some(stem) = w.strip_suffix("er") {
        for suffix in ["e", "es", "ent", "ons", "ez", "é", "ant"] {
            out.push(format!("{stem}{suffix}"));
        }
    }

    // -tion -> -ter / -teur / -trice
    if let Some(stem) = w.strip_suffix("tion") {
        out.push(format!("{stem}ter"));
        out.push(format!("{stem}teur"));
        out.push(format!("{stem}trice"));
    }

    // -eux -> -euse
    if let Some(stem) = w.strip_suffix("eux") {
        out.push(format!("{stem}euse"));
    }

    // -if -> -ive
    if let Some(stem) = w.strip_suffix("if") {
        out.push(format!("{stem}ive"));
    }
}

fn english_variations(w: &str, out: &mut Vec<String>) {
    // Pluralization.
    out.push(format!("{w}s"));
    if let Some(stem) = w.strip_suffix('y') {
        if !stem.is_empty() {
            out.push(format!("{stem}ies"));
        }
    }

    // Verb forms.
    if let Some(stem) = w.strip_suffix('e') {
        if !stem.is_empty() {
            out.push(format!("{stem}d"));
            out.push(format!("{stem}ing"));
        }
    } else {
        out.push(format!("{w}ed"));
        out.push(format!("{w}ing"));
    }

    // Short-word comparative/superlative.
    if w.len() <= 6 {
        out.push(format!("{w}er"));
        out.push(format!("{w}est"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_er_verb_conjugations() {
        let v = word_variations("parler", "fr");
        assert!(v.contains(&"parle".to_string()));
        assert!(v.contains(&"parlent".to_string()));
        assert!(v.contains(&"parlons".to_string()));
    }

    #[test]
    fn english_pluralization_and_gerund() {
        let v = word_variations("walk", "en");
        assert!(v.contains(&"walks".to_string()));
        assert!(v.contains(&"walking".to_string()));
        assert!(v.contains(&"walked".to_string()));
    }

    #[test]
    fn english_y_ending_pluralizes_to_ies() {
        let v = word_variations("city", "en");
        assert!(v.contains(&"cities".to_string()));
    }

    #[test]
    fn unknown_language_has_no_variants() {
        assert!(word_variations("haus", "de").is_empty());
    }
}
