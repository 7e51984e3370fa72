//! Relevance Engine (C5): scores an Expression against a Land's
//! dictionary. Pure and deterministic — no I/O.

pub mod engine;

pub use engine::expression_relevance;
