//! Media Analyzer (C4, §4.4): best-effort image analysis. Errors here
//! are recorded against the Media row and never abort the parent crawl.

pub mod analyzer;
pub mod palette;

pub use analyzer::{analyze, MediaAnalysis};
pub use palette::{dominant_colors, web_safe_histogram};
