use clap::{Parser, Subcommand};
use landcrawl::core::config::load_settings;
use landcrawl::core::db;
use landcrawl::external::{NoOpLlmValidator, NoOpSentimentService};
use landcrawl::jobs::JobCoordinator;
use landcrawl::{crawl, dictionary, domain_crawler, repo};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "landcrawl", about = "Web-intelligence harvesting pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new Land (a topical crawl scope) and its starting URLs.
    CreateLand {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_delimiter = ',', default_value = "en")]
        lang: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        start_urls: Vec<String>,
    },
    /// List every registered Land.
    ListLands,
    /// Seed (or refresh) a Land's weighted keyword dictionary (C2).
    PopulateDict {
        land_id: i64,
        #[arg(long, value_delimiter = ',')]
        terms: Vec<String>,
        #[arg(long)]
        force: bool,
    },
    /// Crawl a Land's pending Expressions (C8).
    CrawlLand {
        land_id: i64,
        #[arg(long, default_value_t = 50)]
        limit: i64,
        /// Use the concurrent fetch variant (§5) instead of the sequential one.
        #[arg(long)]
        parallel: bool,
        /// Restrict selection to Expressions at this exact depth (§4.8 `depth_filter`).
        #[arg(long)]
        depth: Option<i64>,
        /// Restrict selection to Expressions with this exact last HTTP status (§4.8 `http_status_filter`).
        #[arg(long)]
        http_status: Option<i32>,
        /// Gate the LLM Validator call behind this Land crawl (§4.8 `enable_llm`);
        /// falls back to `OPENROUTER_ENABLED` / config when omitted.
        #[arg(long)]
        enable_llm: bool,
    },
    /// Run the page-metadata-only Domain Crawler ladder against a bare domain (C9).
    CrawlDomain { domain: String },
    /// Run a Land crawl as a tracked, progress-reporting job (C10).
    RunJob {
        land_id: i64,
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = load_settings();
    settings.validate()?;

    let pool = db::connect(&settings.resolve_database_url()).await?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(settings.resolve_domain_crawl_user_agent())
        .build()?;

    let cli = Cli::parse();

    match cli.command {
        Command::CreateLand { name, description, lang, start_urls } => {
            let land = repo::land::create(&pool, &name, description.as_deref(), &lang, &start_urls).await?;
            println!("created land #{} \"{}\"", land.id, land.name);
        }

        Command::ListLands => {
            for land in repo::land::all(&pool).await? {
                println!("#{}\t{}\t{:?}", land.id, land.name, land.languages());
            }
        }

        Command::PopulateDict { land_id, terms, force } => {
            let land = repo::land::find(&pool, land_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no land #{land_id}"))?;
            let added = dictionary::populate_land_dictionary(&pool, &land, &terms, force).await?;
            let stats = dictionary::get_land_dictionary_stats(&pool, land_id).await?;
            info!(added, total = stats.total, "dictionary populated");
            println!("added {} entries, {} total, sample: {:?}", added, stats.total, stats.sample);
        }

        Command::CrawlLand { land_id, limit, parallel, depth, http_status, enable_llm } => {
            let land = repo::land::find(&pool, land_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no land #{land_id}"))?;
            let llm_validator = NoOpLlmValidator;
            let sentiment_service = NoOpSentimentService;
            let options = crawl::CrawlOptions {
                depth_filter: depth,
                http_status_filter: http_status,
                enable_llm: enable_llm || settings.openrouter.resolve_enabled(),
            };

            let stats = if parallel {
                crawl::crawl_land_parallel(
                    &pool,
                    &http_client,
                    &land,
                    &settings,
                    &llm_validator,
                    &sentiment_service,
                    limit,
                    settings.resolve_crawler_concurrency(),
                )
                .await?
            } else {
                crawl::crawl_land_filtered(&pool, &http_client, &land, &settings, &llm_validator, &sentiment_service, limit, options)
                    .await?
            };

            println!(
                "crawled {} expressions ({} errors): {:?}",
                stats.processed, stats.errors, stats.http_stats
            );
        }

        Command::CrawlDomain { domain } => {
            let result = domain_crawler::fetch_domain(
                &http_client,
                &settings.resolve_archive_api_base_url(),
                &domain,
                Duration::from_secs(settings.resolve_domain_crawl_timeout()),
            )
            .await;

            match &result.error_code {
                Some(code) => println!("{} failed via {}: {}", domain, code, result.error_message.unwrap_or_default()),
                None => println!(
                    "{} ok via {} (status {:?}): {}",
                    domain,
                    result.source_method,
                    result.http_status,
                    result.title.unwrap_or_default()
                ),
            }
        }

        Command::RunJob { land_id, limit } => {
            let land = repo::land::find(&pool, land_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no land #{land_id}"))?;
            let coordinator = JobCoordinator::new(pool.clone());
            let parameters = serde_json::json!({ "land_id": land_id, "limit": limit });
            let job = coordinator.start_job("crawl_land", &parameters).await?;

            let llm_validator = NoOpLlmValidator;
            let sentiment_service = NoOpSentimentService;
            let pending = crawl::prepare_crawl(&pool, &land, limit).await?;
            let total = pending.len() as u64;
            coordinator.report_progress(job.id, land_id, 0, total, "starting");

            match crawl::crawl_land(&pool, &http_client, &land, &settings, &llm_validator, &sentiment_service, limit).await {
                Ok(stats) => {
                    coordinator.report_progress(job.id, land_id, stats.processed as u64, total, "done");
                    let result_data = serde_json::json!({
                        "processed": stats.processed,
                        "errors": stats.errors,
                        "http_stats": stats.http_stats,
                    });
                    coordinator.complete_job(job.id, &result_data).await?;
                    println!("job #{} completed: {:?}", job.id, stats.http_stats);
                }
                Err(e) => {
                    warn!(job_id = job.id, error = %e, "job failed");
                    coordinator.fail_job(job.id, &e.to_string()).await?;
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
