use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ngram_model::NGramModel;
use super::tokenizer::{UNK, WhiteSpaceTokenizer, is_sentinel};
use super::word_completor::WordCompletor;

/// User-entered text handed to [`SuggestionEngine::suggest`].
///
/// # Variants
/// - `Text(&str)`: raw text, tokenized by the engine's own tokenizer.
/// - `Tokens(&[String])`: a pre-tokenized sequence; the final element is
///   treated as the in-progress word (possibly empty).
pub enum SuggestionInput<'a> {
	Text(&'a str),
	Tokens(&'a [String]),
}

/// Picks the highest-probability candidate; ties go to the
/// lexicographically smaller token, so results do not depend on the
/// underlying table's enumeration order.
fn best_token<I>(candidates: I) -> Option<String>
where
	I: Iterator<Item = (String, f64)>,
{
	candidates
		.max_by(|(a_token, a_prob), (b_token, b_prob)| {
			a_prob.total_cmp(b_prob).then_with(|| b_token.cmp(a_token))
		})
		.map(|(token, _)| token)
}

/// Merges word completion and n-gram prediction into ranked suggestions.
///
/// Holds the three frozen models and composes them per query: the last
/// (possibly partial) word is completed via the [`WordCompletor`], then the
/// text is greedily extended one token at a time via the [`NGramModel`].
///
/// # Responsibilities
/// - Split the input into context and in-progress word
/// - Complete the in-progress word, falling back to the user's literal
///   fragment when the vocabulary offers nothing better
/// - Extend the text and strip sentinel tokens from the result
///
/// # Invariants
/// - No model is mutated after construction; calls are independent, so one
///   engine may serve arbitrarily many concurrent requests without locking
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SuggestionEngine {
	word_completor: WordCompletor,
	ngram_model: NGramModel,
	tokenizer: WhiteSpaceTokenizer,
}

impl SuggestionEngine {
	/// Composes an engine from three trained models.
	pub fn new(
		word_completor: WordCompletor,
		ngram_model: NGramModel,
		tokenizer: WhiteSpaceTokenizer,
	) -> Self {
		Self { word_completor, ngram_model, tokenizer }
	}

	/// Suggests a completion of the input plus `extension_length` further
	/// words.
	///
	/// # Behavior
	/// 1. Raw text is tokenized; the final token becomes the in-progress
	///    word, everything before it the context.
	/// 2. An empty in-progress word skips completion (the user just
	///    finished a word).
	/// 3. Otherwise the best non-[`UNK`] completion is chosen. No
	///    completion at all emits [`UNK`]; if the fragment could not be
	///    resolved, the user's literal fragment is restored at the end.
	/// 4. The n-gram model then extends the running suggestion
	///    `extension_length` times, highest probability first, ties broken
	///    by lexicographic token order.
	/// 5. Sentinel tokens are filtered from the result.
	///
	/// Returns a single best-effort sequence: `_result_count` alternative
	/// completions are accepted for interface compatibility, but beam
	/// search over several diverse results is not implemented.
	pub fn suggest(
		&self,
		input: SuggestionInput,
		extension_length: usize,
		_result_count: usize,
	) -> Vec<Vec<String>> {
		let tokens: Vec<String> = match input {
			SuggestionInput::Text(text) => self.tokenizer.encode(text),
			SuggestionInput::Tokens(tokens) => tokens.to_vec(),
		};

		let (context, last_word) = match tokens.split_last() {
			Some((last, rest)) => (rest.to_vec(), last.clone()),
			None => (Vec::new(), String::new()),
		};

		let mut suggestion: Vec<String> = Vec::new();
		let mut completed = UNK.to_owned();

		if !last_word.is_empty() {
			let (words, probs) = self.word_completor.get_completions(&last_word);
			if words.is_empty() {
				suggestion.push(UNK.to_owned());
			} else {
				match best_token(words.into_iter().zip(probs).filter(|(word, _)| word != UNK)) {
					Some(best) => {
						completed = best.clone();
						suggestion.push(best);
					}
					// Only [UNK] itself matched the fragment
					None => suggestion.push(UNK.to_owned()),
				}
			}
		}

		let mut query = context;
		query.extend(suggestion.iter().cloned());
		for _ in 0..extension_length {
			let (words, probs) = self.ngram_model.predict_next(&query);
			if let Some(best) = best_token(words.into_iter().zip(probs)) {
				suggestion.push(best.clone());
				query.push(best);
			}
		}

		// Keep the user's own typed text when nothing better is known
		if completed == UNK && !last_word.is_empty() && !suggestion.is_empty() {
			suggestion[0] = last_word;
		}

		vec![suggestion.into_iter().filter(|token| !is_sentinel(token)).collect()]
	}

	/// Serializes the engine to an opaque binary blob on disk.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	/// Reconstructs an engine from a blob written by [`Self::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
		let bytes = std::fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn trained_engine(texts: &[&str], order: usize) -> SuggestionEngine {
		let corpus: Vec<String> = texts.iter().map(|t| (*t).to_owned()).collect();
		let tokenizer = WhiteSpaceTokenizer::fit(&corpus, 1, order).unwrap();
		let tokenized: Vec<Vec<String>> = corpus.iter().map(|t| tokenizer.encode(t)).collect();
		let word_completor = WordCompletor::build(&tokenized, 1).unwrap();
		let ngram_model = NGramModel::build(&tokenized, order, 1, 1).unwrap();
		SuggestionEngine::new(word_completor, ngram_model, tokenizer)
	}

	fn owned(tokens: &[&str]) -> Vec<String> {
		tokens.iter().map(|t| (*t).to_owned()).collect()
	}

	#[test]
	fn completes_the_last_word_and_extends() {
		let engine = trained_engine(&["i want to go home"], 2);
		let results = engine.suggest(SuggestionInput::Text("i want to"), 2, 1);
		assert_eq!(results, vec![owned(&["to", "go", "home"])]);
	}

	#[test]
	fn empty_fragment_skips_completion() {
		let engine = trained_engine(&["i want to go home"], 2);
		let tokens = owned(&["[BOS]", "[BOS]", "i", "want", "to", ""]);
		let results = engine.suggest(SuggestionInput::Tokens(&tokens), 2, 1);
		assert_eq!(results, vec![owned(&["go", "home"])]);
	}

	#[test]
	fn unresolvable_fragment_is_preserved_verbatim() {
		let engine = trained_engine(&["i want to go home"], 2);
		let tokens = owned(&["want", "zzz"]);
		let results = engine.suggest(SuggestionInput::Tokens(&tokens), 1, 1);
		// The fragment survives; the unseen context only produced [EOS],
		// which is filtered out
		assert_eq!(results, vec![owned(&["zzz"])]);
	}

	#[test]
	fn ties_break_lexicographically() {
		let engine = trained_engine(&["x b x a"], 1);
		let tokens = owned(&["x", ""]);
		let results = engine.suggest(SuggestionInput::Tokens(&tokens), 1, 1);
		assert_eq!(results, vec![owned(&["a"])]);
	}

	#[test]
	fn sentinels_never_appear_in_results() {
		let engine = trained_engine(&["a b"], 2);
		let results = engine.suggest(SuggestionInput::Text("never seen words"), 3, 1);
		for sequence in &results {
			for token in sequence {
				assert!(!is_sentinel(token), "sentinel {token:?} leaked");
			}
		}
	}

	#[test]
	fn zero_extension_returns_only_the_completion() {
		// A raw-text fragment would be encoded to [UNK] by the tokenizer;
		// a pre-tokenized sequence keeps the partial word intact
		let engine = trained_engine(&["hello world"], 2);
		let tokens = owned(&["hel"]);
		let results = engine.suggest(SuggestionInput::Tokens(&tokens), 0, 1);
		assert_eq!(results, vec![owned(&["hello"])]);
	}

	#[test]
	fn serialized_engine_answers_identically() {
		let engine = trained_engine(&["i want to go home", "i want to go out"], 2);
		let bytes = postcard::to_stdvec(&engine).unwrap();
		let restored: SuggestionEngine = postcard::from_bytes(&bytes).unwrap();

		for text in ["i want to", "go", "want to go", ""] {
			assert_eq!(
				engine.suggest(SuggestionInput::Text(text), 3, 1),
				restored.suggest(SuggestionInput::Text(text), 3, 1),
				"mismatch for input {text:?}"
			);
		}
	}
}
