//! Link/Media Graph Builder (C7, §4.7): turns a cascade result into
//! `Domain`/`Expression`/`ExpressionLink`/`Media` rows.

pub mod builder;
pub mod url_normalize;

pub use builder::{discover, MediaAnalysisContext};
