use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Start-of-sequence sentinel, prepended `context_length` times by `encode`.
pub const BOS: &str = "[BOS]";
/// End-of-sequence sentinel, used as the n-gram model's unseen-context fallback.
pub const EOS: &str = "[EOS]";
/// Unknown-word sentinel, substituted for out-of-vocabulary tokens.
pub const UNK: &str = "[UNK]";

/// Maximal runs of word characters, or maximal runs of other
/// non-whitespace characters. Whitespace never produces a token.
const TOKEN_PATTERN: &str = r"\w+|[^\w\s]+";

fn token_regex() -> Regex {
	// The pattern is a compile-time constant, cannot fail to compile
	Regex::new(TOKEN_PATTERN).unwrap()
}

/// Returns true for the three reserved sentinel tokens.
pub fn is_sentinel(token: &str) -> bool {
	token == BOS || token == EOS || token == UNK
}

static EMPTY_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static FORWARDED: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"-*\sForwarded by.*\s.*-*.*\n|-*Original Message-*\n").unwrap());
static META_LINE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?m)^Forwarded by.*?$|^\s*\d+/\d+/\d{4}.*?$|^\s*From:.*?$|^\s*To:.*?$|^\s*cc:.*?$|^\s*Subject:.*?$",
	)
	.unwrap()
});
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"\[IMAGE\]+|(?:=3D)+|(?:=20)+|=\n|[0-9]{3,}|[0-9]+[.,][0-9]*|[0-9]+(?:-[0-9]*)+|=+|\$|%|-{2,}|(?:https?://)?(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*",
	)
	.unwrap()
});
static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\n]+").unwrap());

/// Strips email boilerplate from a raw message and normalizes it for training.
///
/// # Behavior
/// - Drops everything up to and including the first blank line (header block)
/// - Cuts the message at the first forwarded/original-message marker
/// - Removes `From:`/`To:`/`cc:`/`Subject:` lines, dates, quoted-printable
///   artifacts, URLs and bare domains, long digit runs and separator noise
/// - Collapses whitespace runs to single spaces and lowercases the result
pub fn extract_message_body(text: &str) -> String {
	let body = EMPTY_LINE.splitn(text, 2).last().unwrap_or(text).trim();
	let body = FORWARDED.splitn(body, 2).next().unwrap_or(body);
	let body = META_LINE.replace_all(body, "");
	let body = NOISE.replace_all(&body, "");
	let body = EMPTY_LINE.replace_all(&body, "\n");
	let body = SPACE_RUNS.replace_all(body.trim(), " ");
	body.trim().to_lowercase()
}

/// Tokenizer with a frequency-filtered vocabulary.
///
/// Splits text into word and punctuation tokens, and maps every token
/// outside the fitted vocabulary to [`UNK`]. Encoded sequences start with
/// `context_length` copies of [`BOS`] so the n-gram model always has a
/// full-length context, even at the beginning of a message.
///
/// # Responsibilities
/// - Fit the vocabulary from a raw corpus (tokens with count >= `min_count`)
/// - Encode arbitrary text into a token sequence, read-only after fitting
///
/// # Invariants
/// - The vocabulary always contains the three sentinels
/// - `encode` is pure: the same input always yields the same output
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WhiteSpaceTokenizer {
	/// Number of start sentinels prepended by `encode` (the n-gram order).
	context_length: usize,

	/// Retained tokens plus the three sentinels.
	vocab: HashSet<String>,

	/// Compiled token pattern; rebuilt after deserialization.
	#[serde(skip, default = "token_regex")]
	pattern: Regex,
}

impl WhiteSpaceTokenizer {
	/// Fits a tokenizer on a raw corpus.
	///
	/// Counts token frequency across all documents and retains tokens
	/// occurring at least `min_count` times.
	///
	/// # Errors
	/// Returns an error if the corpus is empty or if no token survives
	/// the frequency filter.
	pub fn fit(corpus: &[String], min_count: usize, context_length: usize) -> Result<Self, String> {
		if corpus.is_empty() {
			return Err("Cannot fit a tokenizer on an empty corpus".to_owned());
		}

		let pattern = token_regex();
		let mut counts: HashMap<String, usize> = HashMap::new();
		for text in corpus {
			for found in pattern.find_iter(text) {
				*counts.entry(found.as_str().to_owned()).or_insert(0) += 1;
			}
		}

		let mut vocab: HashSet<String> = counts
			.into_iter()
			.filter(|(_, count)| *count >= min_count)
			.map(|(token, _)| token)
			.collect();
		if vocab.is_empty() {
			return Err(format!(
				"No token reached min_count = {min_count}, vocabulary would be empty"
			));
		}

		for sentinel in [BOS, EOS, UNK] {
			vocab.insert(sentinel.to_owned());
		}

		Ok(Self { context_length, vocab, pattern })
	}

	/// Encodes a text into a token sequence.
	///
	/// Prepends `context_length` start sentinels, then one token per match
	/// of the token pattern, with out-of-vocabulary tokens replaced by
	/// [`UNK`]. Empty text yields just the sentinels.
	pub fn encode(&self, text: &str) -> Vec<String> {
		let mut tokens = vec![BOS.to_owned(); self.context_length];
		for found in self.pattern.find_iter(text) {
			let token = found.as_str();
			if self.vocab.contains(token) {
				tokens.push(token.to_owned());
			} else {
				tokens.push(UNK.to_owned());
			}
		}
		tokens
	}

	/// The fitted vocabulary, sentinels included.
	pub fn vocabulary(&self) -> &HashSet<String> {
		&self.vocab
	}

	/// Number of start sentinels prepended by `encode`.
	pub fn context_length(&self) -> usize {
		self.context_length
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn corpus(texts: &[&str]) -> Vec<String> {
		texts.iter().map(|t| (*t).to_owned()).collect()
	}

	#[test]
	fn fit_keeps_frequent_tokens_and_sentinels() {
		let tokenizer =
			WhiteSpaceTokenizer::fit(&corpus(&["go home now", "go home", "go"]), 2, 2).unwrap();
		let vocab = tokenizer.vocabulary();
		assert!(vocab.contains("go"));
		assert!(vocab.contains("home"));
		assert!(!vocab.contains("now"));
		for sentinel in [BOS, EOS, UNK] {
			assert!(vocab.contains(sentinel));
		}
	}

	#[test]
	fn encode_prepends_sentinels_and_maps_unknowns() {
		let tokenizer = WhiteSpaceTokenizer::fit(&corpus(&["go home"]), 1, 3).unwrap();
		assert_eq!(
			tokenizer.encode("go somewhere"),
			vec![BOS, BOS, BOS, "go", UNK]
		);
	}

	#[test]
	fn encode_splits_words_and_punctuation() {
		let tokenizer = WhiteSpaceTokenizer::fit(&corpus(&["hello , world !!"]), 1, 0).unwrap();
		assert_eq!(tokenizer.encode("hello, world!!"), vec!["hello", ",", "world", "!!"]);
	}

	#[test]
	fn encode_empty_text_yields_only_sentinels() {
		let tokenizer = WhiteSpaceTokenizer::fit(&corpus(&["a b"]), 1, 2).unwrap();
		assert_eq!(tokenizer.encode(""), vec![BOS, BOS]);
	}

	#[test]
	fn encode_is_idempotent() {
		let tokenizer = WhiteSpaceTokenizer::fit(&corpus(&["one two three"]), 1, 2).unwrap();
		let first = tokenizer.encode("one four three");
		let second = tokenizer.encode("one four three");
		assert_eq!(first, second);
	}

	#[test]
	fn fit_rejects_empty_corpus() {
		assert!(WhiteSpaceTokenizer::fit(&[], 1, 2).is_err());
	}

	#[test]
	fn fit_rejects_fully_filtered_vocabulary() {
		assert!(WhiteSpaceTokenizer::fit(&corpus(&["a b c"]), 10, 2).is_err());
	}

	#[test]
	fn extract_body_drops_headers_and_lowercases() {
		let raw = "Message-ID: <123>\nDate: whatever\n\nHello There,\n\nSee you soon";
		assert_eq!(extract_message_body(raw), "hello there, see you soon");
	}

	#[test]
	fn extract_body_cuts_forwarded_part() {
		let raw = "ID: x\n\nThe plan is fine\n---Original Message---\nFrom: someone\nold text";
		assert_eq!(extract_message_body(raw), "the plan is fine");
	}
}
