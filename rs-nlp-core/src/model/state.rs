use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Smoothed counts of every token observed after one context.
///
/// A `State` is exclusively owned by its `CountTable` entry; contexts
/// never share sub-tables.
///
/// ## Invariants
/// - Every stored count is >= 1 (add-one smoothing)
/// - A token seen in training holds at least 2 (1 smoothing + 1 real)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct State {
	/// Next token → smoothed count.
	/// Example: { "B" => 2, "C" => 1 }
	transitions: BTreeMap<String, u64>,
}

impl State {
	/// Creates a new empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a training occurrence of `token`.
	///
	/// - First sight: count set to 2 (add-one + the occurrence itself).
	/// - Otherwise, the count is increased by one.
	pub fn add_observation(&mut self, token: &str) {
		match self.transitions.get_mut(token) {
			Some(count) => *count += 1,
			None => {
				self.transitions.insert(token.to_owned(), 2);
			}
		}
	}

	/// Grants the add-one credit to a token seen only at test time.
	///
	/// Tokens already present keep their count.
	pub fn add_smoothing(&mut self, token: &str) {
		if !self.transitions.contains_key(token) {
			self.transitions.insert(token.to_owned(), 1);
		}
	}

	/// Inserts a raw count, used when rebuilding from a persisted document.
	pub(crate) fn insert(&mut self, token: String, count: u64) {
		self.transitions.insert(token, count);
	}

	/// Smoothed count of `token`, if known.
	pub fn count(&self, token: &str) -> Option<u64> {
		self.transitions.get(token).copied()
	}

	/// Sum of the counts under this context.
	pub fn total(&self) -> u64 {
		self.transitions.values().sum()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	/// Iterates over `(token, count)` pairs in token order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(k, v)| (k.as_str(), *v))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_observation_then_repeat() {
		let mut state = State::new();
		state.add_observation("a");
		assert_eq!(state.count("a"), Some(2));
		state.add_observation("a");
		assert_eq!(state.count("a"), Some(3));
	}

	#[test]
	fn test_smoothing_does_not_override() {
		let mut state = State::new();
		state.add_observation("a");
		state.add_smoothing("a");
		state.add_smoothing("b");
		state.add_smoothing("b");
		assert_eq!(state.count("a"), Some(2));
		assert_eq!(state.count("b"), Some(1));
		assert_eq!(state.total(), 3);
		assert_eq!(state.count("c"), None);
	}
}
