use crate::core::error::ConfigError;
use std::path::PathBuf;

/// Five-block weighting for the Quality Scorer (§4.6). Must sum to 1.0;
/// validated once at startup (§9 "Dynamic config & runtime flags").
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct QualityWeights {
    pub access: f64,
    pub structure: f64,
    pub richness: f64,
    pub coherence: f64,
    pub integrity: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            access: 0.30,
            structure: 0.15,
            richness: 0.25,
            coherence: 0.20,
            integrity: 0.10,
        }
    }
}

impl QualityWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.access + self.structure + self.richness + self.coherence + self.integrity;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::WeightsDoNotSumToOne(sum));
        }
        Ok(())
    }
}

/// Media analyzer sub-config (§4.4 / §6 configuration keys).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct MediaConfig {
    pub max_file_size_mb: Option<u64>,
    pub n_dominant_colors: Option<usize>,
    pub analyze_media: Option<bool>,
}

impl MediaConfig {
    pub fn resolve_max_file_size_mb(&self) -> u64 {
        self.max_file_size_mb.unwrap_or(10)
    }

    pub fn resolve_n_dominant_colors(&self) -> usize {
        self.n_dominant_colors.unwrap_or(5)
    }

    pub fn resolve_analyze_media(&self) -> bool {
        self.analyze_media.unwrap_or(false)
    }
}

/// Headless-browser sub-config (dynamic media discovery, §4.7/§5).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct PlaywrightConfig {
    pub max_retries: Option<u32>,
    pub timeout_ms: Option<u64>,
}

impl PlaywrightConfig {
    pub fn resolve_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(2)
    }

    pub fn resolve_timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(15_000)
    }
}

/// LLM Validator sub-config. Only an interface is consumed (spec §1); this
/// config just decides whether the stub/real implementation is wired in.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct OpenRouterConfig {
    pub enabled: Option<bool>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl OpenRouterConfig {
    pub fn resolve_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.api_key {
            return Some(k.trim().to_string());
        }
        std::env::var("OPENROUTER_API_KEY").ok().filter(|v| !v.trim().is_empty())
    }

    pub fn resolve_model(&self) -> String {
        if let Some(m) = &self.model {
            if !m.trim().is_empty() {
                return m.clone();
            }
        }
        std::env::var("OPENROUTER_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }
}

/// Top-level config loaded from `landcrawl.json`, mirroring the teacher's
/// `ShadowConfig` file-based-with-env-fallback pattern.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct Settings {
    pub database_url: Option<String>,
    pub crawler_concurrency: Option<usize>,
    pub domain_crawl_timeout: Option<u64>,
    pub domain_crawl_user_agent: Option<String>,
    pub archive_api_base_url: Option<String>,
    pub enable_sentiment_analysis: Option<bool>,
    pub enable_quality_scoring: Option<bool>,
    pub quality_weights: Option<QualityWeights>,
    pub media: MediaConfig,
    pub playwright: PlaywrightConfig,
    pub openrouter: OpenRouterConfig,
}

impl Settings {
    pub fn resolve_database_url(&self) -> String {
        if let Some(u) = &self.database_url {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://landcrawl.db".to_string())
    }

    pub fn resolve_crawler_concurrency(&self) -> usize {
        if let Some(n) = self.crawler_concurrency {
            return n;
        }
        std::env::var("CRAWLER_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    }

    pub fn resolve_domain_crawl_timeout(&self) -> u64 {
        self.domain_crawl_timeout.unwrap_or(30)
    }

    pub fn resolve_domain_crawl_user_agent(&self) -> String {
        self.domain_crawl_user_agent.clone().unwrap_or_else(|| {
            "landcrawl/0.1 (+https://github.com/landcrawl/landcrawl)".to_string()
        })
    }

    pub fn resolve_archive_api_base_url(&self) -> String {
        self.archive_api_base_url
            .clone()
            .unwrap_or_else(|| "https://archive.org".to_string())
    }

    pub fn resolve_sentiment_enabled(&self) -> bool {
        self.enable_sentiment_analysis.unwrap_or(false)
    }

    pub fn resolve_quality_scoring_enabled(&self) -> bool {
        self.enable_quality_scoring.unwrap_or(true)
    }

    pub fn resolve_quality_weights(&self) -> QualityWeights {
        self.quality_weights.clone().unwrap_or_default()
    }

    /// Boot-time validation: reject mis-summed quality weights (§7).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve_quality_weights().validate()
    }
}

/// Load `landcrawl.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `LANDCRAWL_CONFIG` env var path
/// 2. `./landcrawl.json` (process cwd)
/// 3. `../landcrawl.json` (one level up)
///
/// Missing file -> `Settings::default()` (silent, all env-var fallbacks apply).
/// Parse error -> log a warning, return `Settings::default()`.
pub fn load_settings() -> Settings {
    let candidates: Vec<PathBuf> = {
        let mut v = vec![
            PathBuf::from("landcrawl.json"),
            PathBuf::from("../landcrawl.json"),
        ];
        if let Ok(env_path) = std::env::var("LANDCRAWL_CONFIG") {
            v.insert(0, PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(cfg) => {
                    tracing::info!("landcrawl.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "landcrawl.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return Settings::default();
                }
            },
            Err(_) => continue,
        }
    }

    Settings::default()
}
