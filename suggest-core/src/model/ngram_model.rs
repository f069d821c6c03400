use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};

use super::tokenizer::EOS;

type ContextCounts = HashMap<Vec<String>, HashMap<String, usize>>;

/// Fixed-order n-gram language model over word tokens.
///
/// Stores, for every context of `order` consecutive tokens seen during
/// training, the observed next tokens with their occurrence counts, plus a
/// cached per-context total used as the probability denominator.
///
/// # Responsibilities
/// - Accumulate transition counts from a tokenized corpus (parallel by
///   document chunk, merged by counter addition before filtering)
/// - Apply the two-stage count filter (rare transitions, sparse contexts)
/// - Predict the next tokens for a context, with a deterministic fallback
///
/// # Invariants
/// - `order >= 1`; every key in `counts` has exactly `order` tokens
/// - Every surviving transition count is >= `min_token_count` and every
///   surviving context total is >= `min_prefix_count`
/// - `context_totals[context]` equals the sum of `counts[context]` values
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NGramModel {
	/// Context length (number of tokens used to predict the next one).
	order: usize,

	/// Context to next-token occurrence counts.
	counts: ContextCounts,

	/// Cached denominator per surviving context.
	context_totals: HashMap<Vec<String>, usize>,
}

impl NGramModel {
	/// Builds an n-gram model from a tokenized corpus.
	///
	/// # Parameters
	/// - `corpus`: tokenized documents, typically with `order` start
	///   sentinels prepended by the tokenizer.
	/// - `order`: context length, must be >= 1.
	/// - `min_prefix_count`: minimum total count for a context to survive.
	/// - `min_token_count`: minimum count for a single transition to survive.
	///
	/// # Behavior
	/// - Splits the corpus into chunks (CPU count x factor) and counts
	///   transitions in worker threads, collected over an MPSC channel.
	/// - Merges partial counts by addition, then filters: transitions below
	///   `min_token_count` first, then contexts whose remaining total is
	///   below `min_prefix_count`. Merging happens before filtering, so the
	///   result matches a sequential pass.
	///
	/// # Errors
	/// Returns an error if `order` is zero or the corpus is empty.
	pub fn build(
		corpus: &[Vec<String>],
		order: usize,
		min_prefix_count: usize,
		min_token_count: usize,
	) -> Result<Self, String> {
		if order == 0 {
			return Err("N-gram order must be >= 1".to_owned());
		}
		if corpus.is_empty() {
			return Err("Cannot build an n-gram model from an empty corpus".to_owned());
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunk_size = corpus.len().div_ceil(cpus * factor);

		let (tx, rx) = mpsc::channel();
		for chunk in corpus.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<Vec<String>> = chunk.to_vec();

			thread::spawn(move || {
				let partial = Self::count_chunk(&chunk, order);
				tx.send(partial).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut counts = ContextCounts::new();
		for partial in rx.iter() {
			Self::merge_counts(&mut counts, partial);
		}

		// Rare transitions first, then contexts left too sparse
		for next_tokens in counts.values_mut() {
			next_tokens.retain(|_, count| *count >= min_token_count);
		}
		counts.retain(|_, next_tokens| {
			!next_tokens.is_empty()
				&& next_tokens.values().sum::<usize>() >= min_prefix_count
		});

		let context_totals = counts
			.iter()
			.map(|(context, next_tokens)| (context.clone(), next_tokens.values().sum()))
			.collect();

		Ok(Self { order, counts, context_totals })
	}

	/// Counts transitions for one chunk of documents.
	fn count_chunk(documents: &[Vec<String>], order: usize) -> ContextCounts {
		let mut counts = ContextCounts::new();
		for document in documents {
			for i in order..document.len() {
				let context = document[i - order..i].to_vec();
				*counts
					.entry(context)
					.or_default()
					.entry(document[i].clone())
					.or_insert(0) += 1;
			}
		}
		counts
	}

	/// Merges one partial count table into `into` by counter addition.
	fn merge_counts(into: &mut ContextCounts, other: ContextCounts) {
		for (context, next_tokens) in other {
			let entry = into.entry(context).or_default();
			for (token, count) in next_tokens {
				*entry.entry(token).or_insert(0) += count;
			}
		}
	}

	/// Predicts the tokens that may follow `context`, with probabilities.
	///
	/// Only the last `order` tokens of `context` are considered. A context
	/// never seen during training (or removed by filtering, or shorter than
	/// `order`) yields exactly `([EOS], [1.0])`: the designated fallback,
	/// not an error.
	pub fn predict_next(&self, context: &[String]) -> (Vec<String>, Vec<f64>) {
		let window = if context.len() > self.order {
			&context[context.len() - self.order..]
		} else {
			context
		};

		let next_tokens = match self.counts.get(window) {
			Some(next_tokens) => next_tokens,
			None => return (vec![EOS.to_owned()], vec![1.0]),
		};
		// Present for every surviving context
		let total = match self.context_totals.get(window) {
			Some(&total) => total as f64,
			None => return (vec![EOS.to_owned()], vec![1.0]),
		};

		let mut tokens = Vec::with_capacity(next_tokens.len());
		let mut probs = Vec::with_capacity(next_tokens.len());
		for (token, count) in next_tokens {
			tokens.push(token.clone());
			probs.push(*count as f64 / total);
		}
		(tokens, probs)
	}

	/// Context length of the model.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of surviving contexts.
	pub fn context_count(&self) -> usize {
		self.counts.len()
	}
}
