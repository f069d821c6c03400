//! Top-level module for the text suggestion system.
//!
//! This module exposes the trained model types:
//! - Corpus tokenization and vocabulary fitting (`tokenizer`)
//! - Prefix search over the vocabulary (`prefix_tree`)
//! - Frequency-ranked word completion (`word_completor`)
//! - Fixed-order next-word prediction (`ngram_model`)
//! - The high-level suggestion interface (`suggestion`)

/// Whitespace/punctuation tokenizer with sentinel handling.
///
/// Fits a frequency-filtered vocabulary from a raw corpus and encodes
/// arbitrary text into token sequences bounded by start sentinels.
pub mod tokenizer;

/// Prefix tree (trie) over vocabulary tokens.
///
/// Arena-based: nodes live in a flat vector and reference each other
/// by index, so upward traversal needs no shared ownership.
pub mod prefix_tree;

/// Word completion over the prefix tree with frequency statistics.
pub mod word_completor;

/// Fixed-order n-gram language model (`order >= 1`).
///
/// Handles parallel transition counting, two-stage count filtering,
/// and next-token prediction with a deterministic fallback.
pub mod ngram_model;

/// High-level interface merging word completion and n-gram prediction
/// into a single ranked multi-word suggestion.
pub mod suggestion;
