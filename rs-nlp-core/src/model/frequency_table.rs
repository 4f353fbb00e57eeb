use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::{Context, Order};
use super::count_table::CountTable;
use crate::error::{NlpError, Result};

/// Allowed drift of a context's probability sum from 1.
const SUM_TOLERANCE: f64 = 1e-9;

/// Conditional distribution of the next token under one context.
///
/// ## Invariants
/// - Every probability lies in (0, 1]
/// - Probabilities sum to 1 (up to floating-point rounding)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Distribution {
	probabilities: BTreeMap<String, f64>,
}

impl Distribution {
	/// Probability of `token`, if it was observed under this context.
	pub fn probability(&self, token: &str) -> Option<f64> {
		self.probabilities.get(token).copied()
	}

	pub fn len(&self) -> usize {
		self.probabilities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.probabilities.is_empty()
	}

	/// Iterates over `(token, probability)` pairs in token order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.probabilities.iter().map(|(k, v)| (k.as_str(), *v))
	}

	/// Draws a token proportionally to its probability.
	///
	/// Performs an O(n) cumulative scan. Returns `None` if the
	/// distribution is empty.
	pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<&str> {
		let total: f64 = self.probabilities.values().sum();
		if total <= 0.0 {
			return None;
		}

		let mut r = rng.random::<f64>() * total;
		let mut fallback = None;
		for (token, p) in &self.probabilities {
			if r < *p {
				return Some(token.as_str());
			}
			r -= p;
			fallback = Some(token.as_str());
		}

		// Rounding left `r` just above the last bucket
		fallback
	}
}

/// Conditional probabilities derived once from a `CountTable`.
///
/// Immutable after estimation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FrequencyTable {
	order: Order,
	distributions: BTreeMap<Context, Distribution>,
}

#[derive(Serialize, Deserialize)]
struct FrequencyDocument {
	order: usize,
	table: BTreeMap<String, BTreeMap<String, f64>>,
}

impl FrequencyTable {
	/// Normalizes counts into probabilities.
	///
	/// - Unigram: count / sum of all counts
	/// - Bigram: count / sum of the counts under the same context
	///
	/// Returns `None` when the count table is empty (nothing to estimate).
	pub fn compute(counts: &CountTable) -> Option<Self> {
		if counts.is_empty() {
			return None;
		}

		let global_total: u64 = counts.iter().map(|(_, state)| state.total()).sum();
		let mut distributions = BTreeMap::new();

		for (context, state) in counts.iter() {
			if state.is_empty() {
				continue;
			}
			let total = match counts.order() {
				Order::Unigram => global_total,
				Order::Bigram => state.total(),
			};
			let probabilities = state
				.iter()
				.map(|(token, count)| (token.to_owned(), count as f64 / total as f64))
				.collect();
			distributions.insert(context.clone(), Distribution { probabilities });
		}

		Some(Self { order: counts.order(), distributions })
	}

	pub fn order(&self) -> Order {
		self.order
	}

	/// P(token | context), if the pair was counted.
	pub fn probability(&self, context: &Context, token: &str) -> Option<f64> {
		self.distributions.get(context)?.probability(token)
	}

	/// Distribution under `context`, if the context was counted.
	pub fn distribution(&self, context: &Context) -> Option<&Distribution> {
		self.distributions.get(context)
	}

	/// Iterates over contexts and their distributions.
	pub fn iter(&self) -> impl Iterator<Item = (&Context, &Distribution)> {
		self.distributions.iter()
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.distributions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.distributions.is_empty()
	}

	/// Serializes the table as a nested JSON document.
	pub fn to_json(&self) -> Result<String> {
		let table: BTreeMap<String, BTreeMap<String, f64>> = self
			.distributions
			.iter()
			.map(|(context, distribution)| (context.as_key().to_owned(), distribution.probabilities.clone()))
			.collect();
		let document = FrequencyDocument { order: self.order.n(), table };
		Ok(serde_json::to_string_pretty(&document)?)
	}

	/// Rebuilds a table from its JSON document.
	///
	/// # Errors
	/// Fails on malformed JSON, an unsupported order, a probability
	/// outside (0, 1], or a context whose probabilities do not sum to 1.
	pub fn from_json(json: &str) -> Result<Self> {
		let document: FrequencyDocument = serde_json::from_str(json)?;
		let order = Order::try_from(document.order)?;
		let mut distributions = BTreeMap::new();

		for (key, probabilities) in document.table {
			if let Some((token, p)) = probabilities.iter().find(|(_, p)| !(**p > 0.0 && **p <= 1.0)) {
				return Err(NlpError::Format(format!("probability {} for '{}' under '{}'", p, token, key)));
			}
			let sum: f64 = probabilities.values().sum();
			if (sum - 1.0).abs() > SUM_TOLERANCE {
				return Err(NlpError::Format(format!("probabilities under '{}' sum to {}", key, sum)));
			}
			distributions.insert(Context::from_key(order, &key)?, Distribution { probabilities });
		}

		Ok(Self { order, distributions })
	}

	/// Writes the JSON document to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		fs::write(path, self.to_json()?)?;
		Ok(())
	}

	/// Reads a JSON document written by `save`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_json(&fs::read_to_string(path)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::corpus::Sentence;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn sentences(raw: &[&[&str]]) -> Vec<Sentence> {
		raw.iter().map(|s| s.iter().map(|t| (*t).to_owned()).collect()).collect()
	}

	fn bigram_table() -> FrequencyTable {
		let train = sentences(&[&["A", "B", "A", "C"], &["B", "A"], &["C"]]);
		let test = sentences(&[&["A", "D"], &["D", "B"]]);
		FrequencyTable::compute(&CountTable::compute(Order::Bigram, &train, &test)).unwrap()
	}

	#[test]
	fn test_each_context_sums_to_one() {
		for (_, distribution) in bigram_table().iter() {
			let sum: f64 = distribution.iter().map(|(_, p)| p).sum();
			assert!((sum - 1.0).abs() < 1e-9);
			assert!(distribution.iter().all(|(_, p)| p > 0.0 && p <= 1.0));
		}
	}

	#[test]
	fn test_bigram_values() {
		let table = bigram_table();
		// A -> {B: 2, C: 2, D: 1}
		let a = Context::Token("A".to_owned());
		assert!((table.probability(&a, "B").unwrap() - 0.4).abs() < 1e-12);
		assert!((table.probability(&a, "D").unwrap() - 0.2).abs() < 1e-12);
		assert_eq!(table.probability(&a, "Z"), None);
		assert_eq!(table.probability(&Context::Token("Z".to_owned()), "A"), None);
	}

	#[test]
	fn test_unigram_global_normalization() {
		let train = sentences(&[&["a", "a", "b"]]);
		let test = sentences(&[&["c"]]);
		// a: 3, b: 2, c: 1
		let table = FrequencyTable::compute(&CountTable::compute(Order::Unigram, &train, &test)).unwrap();
		assert_eq!(table.len(), 1);
		assert!((table.probability(&Context::Empty, "a").unwrap() - 0.5).abs() < 1e-12);
		assert!((table.probability(&Context::Empty, "c").unwrap() - 1.0 / 6.0).abs() < 1e-12);
	}

	#[test]
	fn test_empty_counts_are_not_computable() {
		assert!(FrequencyTable::compute(&CountTable::new(Order::Bigram)).is_none());
	}

	#[test]
	fn test_json_round_trip() {
		let table = bigram_table();
		let restored = FrequencyTable::from_json(&table.to_json().unwrap()).unwrap();
		assert_eq!(restored.len(), table.len());
		for (context, distribution) in table.iter() {
			for (token, p) in distribution.iter() {
				assert!((restored.probability(context, token).unwrap() - p).abs() < 1e-12);
			}
		}
		assert!(matches!(
			FrequencyTable::from_json(r#"{"order":1,"table":{"":{"a":1.5}}}"#),
			Err(NlpError::Format(_))
		));
	}

	#[test]
	fn test_json_rejects_unnormalized_context() {
		assert!(matches!(
			FrequencyTable::from_json(r#"{"order":2,"table":{"A":{"B":0.1}}}"#),
			Err(NlpError::Format(_))
		));
		assert!(matches!(
			FrequencyTable::from_json(r#"{"order":2,"table":{"<s>":{"A":1.0},"A":{}}}"#),
			Err(NlpError::Format(_))
		));
		let table = FrequencyTable::from_json(r#"{"order":2,"table":{"<s>":{"A":1.0},"A":{"B":0.25,"C":0.75}}}"#).unwrap();
		assert_eq!(table.len(), 2);
	}

	#[test]
	fn test_sample_stays_in_support() {
		let table = bigram_table();
		let distribution = table.distribution(&Context::Start).unwrap();
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..100 {
			let token = distribution.sample(&mut rng).unwrap();
			assert!(distribution.probability(token).is_some());
		}
		assert_eq!(Distribution::default().sample(&mut rng), None);
	}
}
