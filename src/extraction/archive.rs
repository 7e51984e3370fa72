//! Archival fallback rung (§4.3 step 2): look the URL up in a web
//! archive's availability API, fetch the closest snapshot, and re-run
//! the primary extractor on the snapshot HTML. Ported from
//! `domain_crawler.py::_try_archive_org`.

use super::primary::{self, PrimaryResult};
use serde::Deserialize;
use url::Url;

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

/// Ask the wayback availability API for the closest snapshot of `url`,
/// then fetch and extract it. Returns `None` for any failure along the
/// way: no snapshot, a failed fetch, or an extraction that doesn't
/// clear the primary extractor's own gate.
pub async fn extract(client: &reqwest::Client, archive_api_base_url: &str, url: &Url) -> Option<PrimaryResult> {
    let availability_url = format!("{}/wayback/available?url={}", archive_api_base_url, url);
    let availability: AvailabilityResponse = client
        .get(&availability_url)
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?
        .json()
        .await
        .ok()?;

    let snapshot_url = availability.archived_snapshots?.closest?.url;
    let snapshot_parsed = Url::parse(&snapshot_url).ok()?;

    let html = client
        .get(&snapshot_url)
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?
        .text()
        .await
        .ok()?;

    // Relative links inside the snapshot are resolved against the
    // original crawl URL, not the archive's own address (§4.3).
    let _ = snapshot_parsed;
    primary::extract(&html, url)
}
