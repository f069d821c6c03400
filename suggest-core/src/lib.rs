//! N-gram-based text suggestion library.
//!
//! This crate provides the models behind a next-word suggestion system
//! trained on an email corpus, including:
//! - A whitespace/punctuation tokenizer with a frequency-filtered vocabulary
//! - A prefix tree for completing partially typed words
//! - A fixed-order n-gram language model for next-word prediction
//! - A suggestion engine composing the three into ranked multi-word output
//!
//! All models are batch-trained once and frozen; trained structures are
//! read-only and safe to share across threads without locking.

/// Core suggestion models and composition logic.
pub mod model;

/// I/O utilities (corpus loading, path helpers).
pub mod io;
