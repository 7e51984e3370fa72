//! URL canonicalization shared by link and media discovery (§4.6):
//! tracking-param stripping, WordPress-proxy unwrapping, and rejection
//! of URLs that can never become an Expression or Media row. Ported
//! from `crawler_engine.py`'s inline link-cleaning block and
//! `media_processor.py::_clean_media_url`.

use url::Url;

const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "fbclid",
    "gclid",
    "ref",
    "source",
    "campaign",
];

/// Resolve `href` against `base`, strip tracking params, unwrap a
/// WordPress image proxy host, and reject anything that isn't a
/// fetchable http(s) URL. `None` covers empty/anchor/`javascript:`/
/// `mailto:`/`tel:`/`data:` hrefs and unparseable or non-http(s) results.
pub fn canonicalize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    if resolved.host_str().is_none() {
        return None;
    }

    let resolved = unwrap_wordpress_proxy(&resolved).unwrap_or(resolved);
    Some(strip_tracking_params(&resolved))
}

fn strip_tracking_params(url: &Url) -> String {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    if kept.is_empty() {
        clean.to_string()
    } else {
        let query = kept
            .iter()
            .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{k}={v}") })
            .collect::<Vec<_>>()
            .join("&");
        clean.set_query(Some(&query));
        clean.to_string()
    }
}

/// `i{0,1,2}.wp.com/<original-host>/<original-path>?ssl=1` -> the
/// embedded original URL, with `ssl=1` dropped (§4.6).
fn unwrap_wordpress_proxy(url: &Url) -> Option<Url> {
    let host = url.host_str()?;
    if !(host.starts_with("i0.wp.com") || host.starts_with("i1.wp.com") || host.starts_with("i2.wp.com")) {
        return None;
    }

    let mut segments = url.path_segments()?;
    let original_host = segments.next()?;
    let original_path: String = segments.fold(String::new(), |mut acc, seg| {
        acc.push('/');
        acc.push_str(seg);
        acc
    });

    let mut rebuilt = Url::parse(&format!("https://{original_host}{original_path}")).ok()?;
    let kept_query: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, v)| !(k == "ssl" && v == "1"))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    if !kept_query.is_empty() {
        let query = kept_query.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
        rebuilt.set_query(Some(&query));
    }
    Some(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracking_params_but_keeps_others() {
        let base = Url::parse("https://example.com").unwrap();
        let out = canonicalize(&base, "/a?utm_source=x&keep=1").unwrap();
        assert_eq!(out, "https://example.com/a?keep=1");
    }

    #[test]
    fn unwraps_wordpress_image_proxy() {
        let base = Url::parse("https://example.com").unwrap();
        let out = canonicalize(&base, "https://i0.wp.com/host.com/path/image.jpg?ssl=1").unwrap();
        assert_eq!(out, "https://host.com/path/image.jpg");
    }

    #[test]
    fn rejects_non_http_schemes() {
        let base = Url::parse("https://example.com").unwrap();
        assert!(canonicalize(&base, "javascript:void(0)").is_none());
        assert!(canonicalize(&base, "mailto:a@b.com").is_none());
        assert!(canonicalize(&base, "#section").is_none());
        assert!(canonicalize(&base, "data:image/png;base64,abc").is_none());
    }
}
