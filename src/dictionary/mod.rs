//! Dictionary Service (C2): seeds and grows a Land's weighted keyword
//! dictionary from its seed terms, generating morphological variants.

pub mod service;
pub mod variants;

pub use service::{get_land_dictionary_stats, populate_land_dictionary, LandDictionaryStats};
