//! Crawl Engine (C8, §4.8): orchestrates fetch -> extract -> score ->
//! discover for a Land's pending Expressions.

pub mod engine;
pub mod worker_pool;

pub use engine::{
    crawl_expression, crawl_expressions, crawl_land, crawl_land_filtered, crawl_land_parallel,
    prepare_crawl, prepare_crawl_filtered, CrawlOptions, CrawlStats,
};
