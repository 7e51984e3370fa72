//! Domain Crawler (C9, §4.9): single-domain metadata fetch, the same
//! 3-rung fallback ladder as the Extraction Cascade (C3) but operating
//! on a bare domain name rather than a discovered URL, and page-level
//! rather than per-Expression. Ported from
//! `domain_crawler.py::DomainCrawler.fetch_domain`'s rung order and
//! exact error-code taxonomy.

use crate::extraction::{metadata::extract_page_metadata, primary};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::{Duration, Instant};
use url::Url;

/// Always returned, never an `Err` — a failing domain still produces a
/// result the caller can persist, it just carries an `error_code` (§4.9).
#[derive(Debug, Clone)]
pub struct DomainCrawlResult {
    pub domain: String,
    pub http_status: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub language: Option<String>,
    pub content: Option<String>,
    pub source_method: &'static str,
    pub fetched_at: DateTime<Utc>,
    pub fetch_duration_ms: u64,
    pub retry_count: u32,
    pub error_code: Option<&'static str>,
    pub error_message: Option<String>,
}

impl DomainCrawlResult {
    fn failed(domain: &str, started: Instant, retry_count: u32, error_code: &'static str, error_message: String) -> Self {
        Self {
            domain: domain.to_string(),
            http_status: None,
            title: None,
            description: None,
            keywords: None,
            language: None,
            content: None,
            source_method: "failed",
            fetched_at: Utc::now(),
            fetch_duration_ms: started.elapsed().as_millis() as u64,
            retry_count,
            error_code: Some(error_code),
            error_message: Some(error_message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    archived_snapshots: Option<ArchivedSnapshots>,
}

#[derive(Debug, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Deserialize)]
struct ClosestSnapshot {
    url: String,
}

/// Classify a `reqwest::Error` into the connection/timeout/SSL buckets
/// the spec's error taxonomy distinguishes (§4.9).
fn classify_transport_error(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "ERR_TIMEOUT"
    } else if err.is_connect() {
        let text = err.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("ssl") || text.contains("tls") {
            "ERR_SSL"
        } else {
            "ERR_CONNECTION"
        }
    } else {
        "ERR_CONNECTION"
    }
}

/// Rung 1 (§4.9 step 1): primary extractor over `https://{domain}`,
/// automatically retrying over `http://{domain}` when the HTTPS attempt
/// can't even connect. Extraction itself runs the same readability +
/// DOM-meta-fallback pass the Extraction Cascade's primary rung does.
async fn try_primary(
    client: &reqwest::Client,
    domain: &str,
    retry_count: &mut u32,
) -> Result<(Url, i32, primary::PrimaryResult), &'static str> {
    for scheme in ["https", "http"] {
        let Ok(url) = Url::parse(&format!("{scheme}://{domain}")) else {
            continue;
        };
        if scheme == "http" {
            *retry_count += 1;
        }

        let response = match client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(_) if scheme == "https" => continue,
            Err(_) => return Err("ERR_TRAFI_DOWNLOAD"),
        };
        let status = response.status().as_u16() as i32;
        let html = match response.text().await {
            Ok(h) => h,
            Err(_) if scheme == "https" => continue,
            Err(_) => return Err("ERR_TRAFI_DOWNLOAD"),
        };

        match primary::extract(&html, &url) {
            Some(result) if result.readable.chars().count() >= 100 => return Ok((url, status, result)),
            _ if scheme == "https" => continue,
            _ => return Err("ERR_TRAFI"),
        }
    }
    Err("ERR_TRAFI_DOWNLOAD")
}

/// Rung 2 (§4.9 step 2): web-archive availability lookup, then fetch +
/// extract the closest snapshot.
async fn try_archive(
    client: &reqwest::Client,
    archive_api_base_url: &str,
    domain: &str,
) -> Result<(Url, primary::PrimaryResult), &'static str> {
    let target = format!("https://{domain}");
    let Ok(target_url) = Url::parse(&target) else {
        return Err("ERR_ARCHIVE");
    };

    let availability_url = format!("{archive_api_base_url}/wayback/available?url={target}");
    let availability = client
        .get(&availability_url)
        .send()
        .await
        .map_err(|_| "ERR_ARCHIVE")?
        .error_for_status()
        .map_err(|_| "ERR_ARCHIVE_HTTP")?
        .json::<AvailabilityResponse>()
        .await
        .map_err(|_| "ERR_ARCHIVE")?;

    let snapshot_url = availability
        .archived_snapshots
        .and_then(|s| s.closest)
        .map(|c| c.url)
        .ok_or("ERR_ARCHIVE_NOTFOUND")?;

    let html = client
        .get(&snapshot_url)
        .send()
        .await
        .map_err(|_| "ERR_ARCHIVE")?
        .error_for_status()
        .map_err(|_| "ERR_ARCHIVE_HTTP")?
        .text()
        .await
        .map_err(|_| "ERR_ARCHIVE")?;

    // Links inside the snapshot resolve against the original domain,
    // not the archive's own address — same rule the cascade follows.
    let result = primary::extract(&html, &target_url).ok_or("ERR_ARCHIVE")?;
    Ok((target_url, result))
}

/// Rung 3 (§4.9 step 3): direct HTTP GET, HTTPS then HTTP, accepting
/// invalid certificates at this last rung only (mirrors `verify=False`
/// in the original `requests`-based crawler).
async fn try_direct(domain: &str, timeout: Duration, retry_count: &mut u32) -> Result<(Url, i32, String), &'static str> {
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(timeout)
        .build()
        .map_err(|_| "ERR_HTTP_UNKNOWN")?;

    let mut last_err: Option<&'static str> = None;
    for scheme in ["https", "http"] {
        let Ok(url) = Url::parse(&format!("{scheme}://{domain}")) else {
            continue;
        };
        if scheme == "http" {
            *retry_count += 1;
        }

        match client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    last_err = Some(match status.as_u16() {
                        code if (400..600).contains(&code) => {
                            return Err(http_status_error_code(code));
                        }
                        _ => "ERR_HTTP_UNKNOWN",
                    });
                    continue;
                }
                let html = response.text().await.map_err(|_| "ERR_HTTP_UNKNOWN")?;
                return Ok((url, status.as_u16() as i32, html));
            }
            Err(e) => {
                last_err = Some(classify_transport_error(&e));
            }
        }
    }

    Err(last_err.unwrap_or("ERR_CONNECTION"))
}

/// `ERR_HTTP_{code}` carries the literal status code in its tag; since
/// the taxonomy is a fixed enum of `&'static str`, the common codes are
/// interned and anything else falls back to `ERR_HTTP_UNKNOWN`.
fn http_status_error_code(code: u16) -> &'static str {
    match code {
        400 => "ERR_HTTP_400",
        401 => "ERR_HTTP_401",
        403 => "ERR_HTTP_403",
        404 => "ERR_HTTP_404",
        410 => "ERR_HTTP_410",
        429 => "ERR_HTTP_429",
        500 => "ERR_HTTP_500",
        502 => "ERR_HTTP_502",
        503 => "ERR_HTTP_503",
        504 => "ERR_HTTP_504",
        _ => "ERR_HTTP_UNKNOWN",
    }
}

/// Run the full 3-rung ladder against `domain` (a bare netloc, no
/// scheme). Never throws; every outcome, including total failure,
/// comes back as a `DomainCrawlResult` (§4.9, §7 propagation policy).
pub async fn fetch_domain(
    http_client: &reqwest::Client,
    archive_api_base_url: &str,
    domain: &str,
    timeout: Duration,
) -> DomainCrawlResult {
    let started = Instant::now();
    let mut retry_count = 0u32;

    match try_primary(http_client, domain, &mut retry_count).await {
        Ok((url, status, result)) => {
            return DomainCrawlResult {
                domain: domain.to_string(),
                http_status: Some(status),
                title: result.metadata.title.or_else(|| Some(url.to_string())),
                description: result.metadata.description,
                keywords: result.metadata.keywords,
                language: result.metadata.language,
                content: Some(result.readable),
                source_method: "primary",
                fetched_at: Utc::now(),
                fetch_duration_ms: started.elapsed().as_millis() as u64,
                retry_count,
                error_code: None,
                error_message: None,
            };
        }
        Err(_primary_err) => {}
    }

    if let Ok((url, result)) = try_archive(http_client, archive_api_base_url, domain).await {
        return DomainCrawlResult {
            domain: domain.to_string(),
            http_status: None,
            title: result.metadata.title.or_else(|| Some(url.to_string())),
            description: result.metadata.description,
            keywords: result.metadata.keywords,
            language: result.metadata.language,
            content: Some(result.readable),
            source_method: "archive",
            fetched_at: Utc::now(),
            fetch_duration_ms: started.elapsed().as_millis() as u64,
            retry_count,
            error_code: None,
            error_message: None,
        };
    }

    match try_direct(domain, timeout, &mut retry_count).await {
        Ok((url, status, html)) => {
            let meta = extract_page_metadata(&html, &url);
            DomainCrawlResult {
                domain: domain.to_string(),
                http_status: Some(status),
                title: meta.title.or_else(|| Some(url.to_string())),
                description: meta.description,
                keywords: meta.keywords,
                language: meta.language,
                content: Some(html),
                source_method: "direct",
                fetched_at: Utc::now(),
                fetch_duration_ms: started.elapsed().as_millis() as u64,
                retry_count,
                error_code: None,
                error_message: None,
            }
        }
        Err(code) => DomainCrawlResult::failed(domain, started, retry_count, "ERR_HTTP_ALL", format!("all rungs exhausted, last error {code}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_error_code_maps_known_codes() {
        assert_eq!(http_status_error_code(404), "ERR_HTTP_404");
        assert_eq!(http_status_error_code(500), "ERR_HTTP_500");
        assert_eq!(http_status_error_code(418), "ERR_HTTP_UNKNOWN");
    }

    #[tokio::test]
    async fn unreachable_domain_exhausts_every_rung_with_a_terminal_error_code() {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        let result = fetch_domain(&client, "https://archive.org", "example.invalid.nonexistent-tld-zzz", Duration::from_millis(300)).await;
        assert_eq!(result.source_method, "failed");
        assert_eq!(result.error_code, Some("ERR_HTTP_ALL"));
        assert!(result.http_status.is_none());
    }
}
