//! Statistical next-word prediction library.
//!
//! This crate provides a word-level n-gram prediction system including:
//! - Normalizing word tokenization
//! - Multi-order n-gram counting with additive (Laplace) smoothing
//! - Back-off prediction returning ranked next-word candidates
//! - Binary model persistence with atomic file replacement
//! - A session controller driving retraining and persistence
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core model, persistence and session logic.
///
/// This module exposes the high-level prediction interface while keeping
/// internal table representations private.
pub mod model;

/// I/O utilities (corpus reading, atomic writes).
pub mod io;
