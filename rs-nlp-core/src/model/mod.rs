//! Statistical n-gram language model.
//!
//! This module provides a unigram/bigram model with add-one smoothing:
//! - Orders and conditioning contexts (`Order`, `Context`)
//! - Smoothed counting over train ∪ test (`CountTable`)
//! - Conditional probability estimation (`FrequencyTable`)
//! - Sentence scoring and sampling (`LanguageModel`)
//! - Held-out perplexity (`perplexity`)

/// Model order and n-gram contexts, including the `<s>` boundary marker.
pub mod context;

/// Add-one smoothed count table.
///
/// Counts training windows (2 on first sight, +1 afterwards) and grants
/// test-only windows a count of 1. Persisted as nested JSON.
pub mod count_table;

/// Conditional probability table estimated from counts.
pub mod frequency_table;

/// High-level model: construction, caching, scoring and sampling.
pub mod language_model;

/// Perplexity evaluation over a held-out corpus.
pub mod perplexity;

/// Fingerprinted binary model cache.
mod cache;

/// Per-context counts, reachable through `CountTable::state`.
mod state;

pub use cache::CachePolicy;
pub use context::{BOUNDARY_MARKER, Context, Order};
pub use count_table::CountTable;
pub use frequency_table::{Distribution, FrequencyTable};
pub use language_model::LanguageModel;
pub use perplexity::{PerplexityReport, evaluate_perplexity};
pub use state::State;
