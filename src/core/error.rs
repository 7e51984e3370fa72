use thiserror::Error;

/// Top-level error type for engine-level failures — the ones that abort a
/// whole `crawl_land` invocation rather than counting against a single
/// Expression (see spec §7's propagation policy).
#[derive(Error, Debug)]
pub enum CrateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("land {0} not found")]
    LandNotFound(i64),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("quality weights must sum to 1.0, got {0}")]
    WeightsDoNotSumToOne(f64),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-Expression extraction failures never propagate to the caller (C3's
/// contract); this type exists for the internal extractor chain to reason
/// about why a rung declined, it is never surfaced outside `extraction::`.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("http fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("readable content below the success gate ({0} chars)")]
    BelowGate(usize),

    #[error("no archive.org snapshot available")]
    NoSnapshot,

    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
