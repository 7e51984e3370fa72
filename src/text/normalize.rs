use regex::Regex;
use std::sync::OnceLock;

fn html_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strip residual markup, unify curly quotes/dashes to ASCII, drop
/// anything that is neither alphabetic (incl. accented), a hyphen nor
/// whitespace, and collapse whitespace runs (§4.1).
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let no_tags = html_tag_re().replace_all(text, " ");

    let unified: String = no_tags
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            other => other,
        })
        .collect();

    let filtered: String = unified
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || *c == '-' || c.is_ascii_digit())
        .collect();

    whitespace_re().replace_all(&filtered, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let out = normalize_text("<p>Hello   <b>world</b>\n\n!</p>");
        assert_eq!(out, "Hello world");
    }

    #[test]
    fn unifies_curly_quotes() {
        let out = normalize_text("l\u{2019}\u{00e9}t\u{00e9}");
        assert_eq!(out, "l'été");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(normalize_text(""), "");
    }
}
