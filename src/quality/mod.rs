//! Quality Scorer (C6): five weighted blocks — access, structure,
//! richness, coherence, integrity — folded into one score in `[0, 1]`
//! plus a human-readable category and reason string.

pub mod scorer;

pub use scorer::{score_expression, QualityCategory, QualityReport};
