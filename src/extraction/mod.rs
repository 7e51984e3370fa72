//! Content Extraction Cascade (C3): an ordered chain of extractors, each
//! tried in turn until one clears the minimum-content gate.

pub mod archive;
pub mod cascade;
pub mod heuristic;
pub mod media_markdown;
pub mod metadata;
pub mod primary;

pub use cascade::{extract, ExtractedContent, ExtractionAttempt};
