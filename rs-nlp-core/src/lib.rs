//! Classroom NLP toolkit.
//!
//! This crate provides:
//! - A corpus loader for POS-tagged, segmented text
//! - Unigram/bigram language models with add-one smoothing,
//!   sentence scoring and held-out perplexity
//! - Dictionary-based Chinese word segmentation (maximum/minimum matching)
//! - A rule-based English lemmatizer
//!
//! Everything is single-threaded and batch-oriented: models are built once
//! from fully loaded corpora and are read-only afterwards.

/// Corpus loading (tag stripping, stopword filtering, sentence splitting).
pub mod corpus;

/// Crate-wide error type.
pub mod error;

/// N-gram language model: counting, estimation, scoring, perplexity.
pub mod model;

/// Dictionary-based word segmentation.
pub mod segmentation;

/// Suffix-rule lemmatization.
pub mod lemmatization;

/// I/O utilities (file loading, path helpers).
pub mod io;

pub use error::{NlpError, Result};
