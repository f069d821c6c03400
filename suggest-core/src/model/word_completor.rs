use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::prefix_tree::PrefixTree;

/// Completes a partially typed word using corpus frequencies.
///
/// Wraps a [`PrefixTree`] over the retained vocabulary together with a
/// token frequency table, and ranks completions by their unnormalized
/// corpus probability `count / total_words`.
///
/// # Invariants
/// - Every token in the prefix tree has an entry in `counts`
/// - `total_words` is the sum of all retained counts, so each returned
///   probability lies in (0, 1]
/// - Probabilities for one prefix need not sum to 1: the denominator is
///   shared by the whole retained vocabulary, not just the prefix matches
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WordCompletor {
	/// Occurrence count per retained token.
	counts: HashMap<String, usize>,

	/// Total occurrences of all retained tokens.
	total_words: usize,

	/// Prefix tree over the retained tokens.
	prefix_tree: PrefixTree,
}

impl WordCompletor {
	/// Builds a completor from a tokenized corpus.
	///
	/// Counts every token occurrence across every document, drops tokens
	/// occurring fewer than `min_count` times, and builds the prefix tree
	/// over the survivors.
	///
	/// # Errors
	/// Returns an error if the corpus is empty or if every token falls
	/// below `min_count`.
	pub fn build(corpus: &[Vec<String>], min_count: usize) -> Result<Self, String> {
		if corpus.is_empty() {
			return Err("Cannot build a word completor from an empty corpus".to_owned());
		}

		let mut counts: HashMap<String, usize> = HashMap::new();
		for document in corpus {
			for token in document {
				*counts.entry(token.clone()).or_insert(0) += 1;
			}
		}
		counts.retain(|_, count| *count >= min_count);
		if counts.is_empty() {
			return Err(format!(
				"No token reached min_count = {min_count}, nothing to complete"
			));
		}

		let total_words = counts.values().sum();
		let prefix_tree = PrefixTree::build(counts.keys())?;

		Ok(Self { counts, total_words, prefix_tree })
	}

	/// Returns the vocabulary tokens starting with `prefix`, paired with
	/// their corpus probabilities.
	///
	/// The two vectors are parallel: same length, same order. An unmatched
	/// prefix yields two empty vectors.
	pub fn get_completions(&self, prefix: &str) -> (Vec<String>, Vec<f64>) {
		let words = self.prefix_tree.search_prefix(prefix);
		let probs = words
			.iter()
			.map(|word| {
				self.counts.get(word).map_or(0.0, |count| *count as f64 / self.total_words as f64)
			})
			.collect();
		(words.to_vec(), probs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn doc(tokens: &[&str]) -> Vec<String> {
		tokens.iter().map(|t| (*t).to_owned()).collect()
	}

	#[test]
	fn completions_are_parallel_and_in_unit_range() {
		let completor =
			WordCompletor::build(&[doc(&["the", "they", "the", "to"])], 1).unwrap();
		let (words, probs) = completor.get_completions("th");
		assert_eq!(words.len(), probs.len());
		assert!(!words.is_empty());
		for prob in probs {
			assert!(prob > 0.0 && prob <= 1.0);
		}
	}

	#[test]
	fn probability_is_count_over_total_retained() {
		// "the" appears 50 times out of 500 retained tokens
		let mut tokens = vec!["the"; 50];
		tokens.extend(vec!["filler"; 450]);
		let completor = WordCompletor::build(&[doc(&tokens)], 1).unwrap();

		let (words, probs) = completor.get_completions("th");
		let position = words.iter().position(|w| w == "the").unwrap();
		assert!((probs[position] - 0.1).abs() < 1e-12);
	}

	#[test]
	fn filtered_tokens_are_not_completed_but_keep_no_weight() {
		let completor =
			WordCompletor::build(&[doc(&["spam", "spam", "spam", "rare"])], 2).unwrap();
		let (words, probs) = completor.get_completions("");
		assert_eq!(words, ["spam"]);
		// "rare" was dropped before the total was summed
		assert!((probs[0] - 1.0).abs() < 1e-12);
	}

	#[test]
	fn unmatched_prefix_yields_empty_result() {
		let completor = WordCompletor::build(&[doc(&["alpha"])], 1).unwrap();
		let (words, probs) = completor.get_completions("z");
		assert!(words.is_empty());
		assert!(probs.is_empty());
	}

	#[test]
	fn empty_corpus_is_rejected() {
		assert!(WordCompletor::build(&[], 1).is_err());
	}

	#[test]
	fn fully_filtered_corpus_is_rejected() {
		assert!(WordCompletor::build(&[doc(&["once"])], 2).is_err());
	}
}
