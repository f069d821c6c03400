use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One character position along some token's spelling.
///
/// Nodes live in the tree's arena and reference each other by index,
/// so a node can reach its parent without shared ownership.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
struct PrefixTreeNode {
	/// Next character to child index. Unique per character.
	children: HashMap<char, usize>,

	/// Index of the parent node; `None` only for the root.
	parent: Option<usize>,

	/// Substring spelled by the path from the root to this node.
	text: String,

	/// Whether `text` is itself a complete vocabulary token.
	is_end_of_word: bool,

	/// Complete vocabulary tokens reachable in the subtree rooted here,
	/// in insertion order. Includes this node's own token if terminal.
	descendants: Vec<String>,
}

/// Prefix tree over vocabulary tokens.
///
/// Built once from the full vocabulary and frozen. Every node records the
/// complete tokens below it, so a prefix search is a walk to the matching
/// node followed by a single slice borrow.
///
/// # Invariants
/// - Node 0 is the root (empty prefix)
/// - For every node, `descendants` holds exactly the vocabulary tokens
///   whose spelling has this node's `text` as a prefix, regardless of
///   insertion order (assuming the vocabulary holds no duplicates)
/// - The root's `descendants` lists the entire vocabulary
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PrefixTree {
	nodes: Vec<PrefixTreeNode>,
}

impl PrefixTree {
	/// Builds a prefix tree from a vocabulary.
	///
	/// # Errors
	/// Returns an error if the vocabulary is empty.
	pub fn build<I, S>(vocabulary: I) -> Result<Self, String>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut tree = Self { nodes: vec![PrefixTreeNode::default()] };

		let mut inserted = 0;
		for word in vocabulary {
			tree.insert(word.as_ref());
			inserted += 1;
		}
		if inserted == 0 {
			return Err("Cannot build a prefix tree from an empty vocabulary".to_owned());
		}

		Ok(tree)
	}

	/// Inserts one token, creating nodes on demand, then records the token
	/// on every node along its path, root included.
	fn insert(&mut self, word: &str) {
		let mut node_idx = 0;
		for c in word.chars() {
			let next_idx = match self.nodes[node_idx].children.get(&c) {
				Some(&idx) => idx,
				None => {
					let idx = self.nodes.len();
					let mut text = self.nodes[node_idx].text.clone();
					text.push(c);
					self.nodes.push(PrefixTreeNode {
						parent: Some(node_idx),
						text,
						..PrefixTreeNode::default()
					});
					self.nodes[node_idx].children.insert(c, idx);
					idx
				}
			};
			node_idx = next_idx;
		}

		self.nodes[node_idx].is_end_of_word = true;

		// Walk back up, appending the token to each ancestor's list
		let word = self.nodes[node_idx].text.clone();
		let mut current = Some(node_idx);
		while let Some(idx) = current {
			self.nodes[idx].descendants.push(word.clone());
			current = self.nodes[idx].parent;
		}
	}

	/// Returns all vocabulary tokens starting with `prefix`, in the order
	/// they were inserted during construction.
	///
	/// An unmatched prefix yields an empty slice; the empty prefix yields
	/// the entire vocabulary.
	pub fn search_prefix(&self, prefix: &str) -> &[String] {
		let mut node_idx = 0;
		for c in prefix.chars() {
			match self.nodes[node_idx].children.get(&c) {
				Some(&idx) => node_idx = idx,
				None => return &[],
			}
		}
		&self.nodes[node_idx].descendants
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_tree() -> PrefixTree {
		PrefixTree::build(["the", "then", "they", "to", "a"]).unwrap()
	}

	#[test]
	fn every_token_is_found_under_all_its_prefixes() {
		let tree = sample_tree();
		for token in ["the", "then", "they", "to", "a"] {
			for end in 0..=token.len() {
				let prefix = &token[..end];
				assert!(
					tree.search_prefix(prefix).contains(&token.to_owned()),
					"{token:?} missing under prefix {prefix:?}"
				);
			}
		}
	}

	#[test]
	fn empty_prefix_returns_whole_vocabulary() {
		let tree = sample_tree();
		let mut all = tree.search_prefix("").to_vec();
		all.sort();
		assert_eq!(all, vec!["a", "the", "then", "they", "to"]);
	}

	#[test]
	fn unmatched_prefix_returns_nothing() {
		let tree = sample_tree();
		assert!(tree.search_prefix("x").is_empty());
		assert!(tree.search_prefix("thex").is_empty());
		assert!(tree.search_prefix("toolong").is_empty());
	}

	#[test]
	fn descendants_keep_insertion_order() {
		let tree = PrefixTree::build(["tea", "ten", "team"]).unwrap();
		assert_eq!(tree.search_prefix("te"), ["tea", "ten", "team"]);
	}

	#[test]
	fn insertion_order_does_not_change_contents() {
		let forward = PrefixTree::build(["ab", "abc", "b"]).unwrap();
		let backward = PrefixTree::build(["b", "abc", "ab"]).unwrap();
		for prefix in ["", "a", "ab", "abc", "b"] {
			let mut lhs = forward.search_prefix(prefix).to_vec();
			let mut rhs = backward.search_prefix(prefix).to_vec();
			lhs.sort();
			rhs.sort();
			assert_eq!(lhs, rhs, "mismatch for prefix {prefix:?}");
		}
	}

	#[test]
	fn empty_vocabulary_is_rejected() {
		assert!(PrefixTree::build(Vec::<String>::new()).is_err());
	}
}
