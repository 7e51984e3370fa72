//! Repository layer: one file per entity, thin wrappers around `sqlx`
//! queries built at runtime with `sqlx::query_as`/`sqlx::query` rather
//! than the compile-time-checked `query!` macros, since nothing in this
//! exercise links against a live database at build time.

pub mod domain;
pub mod expression;
pub mod job;
pub mod land;
pub mod link;
pub mod media;
pub mod word;
