//! Top-level module for the next-word prediction system.
//!
//! This crate provides a multi-order statistical next-word predictor,
//! including:
//! - Word tokenization (`tokenizer`)
//! - The multi-order counting model (`WordModel`)
//! - Internal fixed-order tables (`NGramTable`) and context states (`State`)
//! - Binary model persistence (`ModelStore`)
//! - A high-level session interface (`Session`)

/// Word tokenization.
///
/// Normalizes raw text into lowercase word tokens, mapping punctuation
/// other than apostrophes to word boundaries.
pub mod tokenizer;

/// Multi-order next-word model.
///
/// Handles training text ingestion, n-gram counting for orders 2..N,
/// and smoothed back-off prediction of ranked next-word candidates.
pub mod word_model;

/// Model persistence.
///
/// Serializes the full model state behind a self-describing header and
/// reads it back, replacing the target file atomically on save.
pub mod store;

/// Session management.
///
/// Owns a model instance, accumulates incoming texts into a bounded
/// history and drives retraining and persistence.
pub mod session;

/// Fixed-order n-gram table (`n >= 2`).
///
/// Tracks continuation counts per context of length `n - 1`.
/// This module is not exposed publicly.
mod ngram_table;

/// Internal representation of a single context's continuations.
///
/// Tracks next-word occurrence counts and their running total.
/// This module is not exposed publicly.
mod state;
