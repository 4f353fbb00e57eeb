use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::context::{Context, Order};
use super::state::State;
use crate::corpus::Sentence;
use crate::error::{NlpError, Result};

/// Add-one smoothed n-gram counts over the train ∪ test vocabulary.
///
/// # Responsibilities
/// - Count `(context, token)` windows of the training corpus
/// - Grant the add-one credit to windows seen only in the test corpus
/// - Persist to / restore from a nested JSON document
///
/// # Invariants
/// - Every stored count is >= 1
/// - Each context owns its own `State`
#[derive(Clone, Debug, PartialEq)]
pub struct CountTable {
	order: Order,
	states: BTreeMap<Context, State>,
}

/// Persisted form: `{ "order": 2, "table": { "<s>": { "A": 2 } } }`.
#[derive(Serialize, Deserialize)]
struct CountDocument {
	order: usize,
	table: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CountTable {
	/// Creates an empty table.
	pub fn new(order: Order) -> Self {
		Self { order, states: BTreeMap::new() }
	}

	/// Counts the training windows, then smooths the test windows.
	///
	/// The whole training corpus is processed before the test corpus, so
	/// a window present in both keeps its training count.
	pub fn compute(order: Order, train: &[Sentence], test: &[Sentence]) -> Self {
		let mut table = Self::new(order);

		for sentence in train {
			for (index, token) in sentence.iter().enumerate() {
				table.state_mut(Context::at(order, sentence, index)).add_observation(token);
			}
		}
		for sentence in test {
			for (index, token) in sentence.iter().enumerate() {
				table.state_mut(Context::at(order, sentence, index)).add_smoothing(token);
			}
		}

		debug!("{}-gram counts: {} contexts", order.n(), table.states.len());
		table
	}

	fn state_mut(&mut self, context: Context) -> &mut State {
		self.states.entry(context).or_default()
	}

	pub fn order(&self) -> Order {
		self.order
	}

	/// Smoothed count of `token` under `context`, if known.
	pub fn count(&self, context: &Context, token: &str) -> Option<u64> {
		self.states.get(context)?.count(token)
	}

	/// Counts stored under `context`.
	pub fn state(&self, context: &Context) -> Option<&State> {
		self.states.get(context)
	}

	/// Iterates over contexts and their counts.
	pub fn iter(&self) -> impl Iterator<Item = (&Context, &State)> {
		self.states.iter()
	}

	/// True when no window has been counted.
	pub fn is_empty(&self) -> bool {
		self.states.values().all(State::is_empty)
	}

	/// Serializes the table as a nested JSON document.
	pub fn to_json(&self) -> Result<String> {
		let table: BTreeMap<String, BTreeMap<String, u64>> = self
			.states
			.iter()
			.map(|(context, state)| {
				let counts: BTreeMap<String, u64> = state.iter().map(|(t, c)| (t.to_owned(), c)).collect();
				(context.as_key().to_owned(), counts)
			})
			.collect();
		let document = CountDocument { order: self.order.n(), table };
		Ok(serde_json::to_string_pretty(&document)?)
	}

	/// Rebuilds a table from its JSON document.
	///
	/// # Errors
	/// - `NlpError::Parse` on malformed JSON
	/// - `NlpError::InvalidOrder` / `NlpError::Format` on bad order, keys or zero counts
	pub fn from_json(json: &str) -> Result<Self> {
		let document: CountDocument = serde_json::from_str(json)?;
		let order = Order::try_from(document.order)?;
		let mut table = Self::new(order);

		for (key, counts) in document.table {
			let context = Context::from_key(order, &key)?;
			let state = table.state_mut(context);
			for (token, count) in counts {
				if count == 0 {
					return Err(NlpError::Format(format!("zero count for '{}' under '{}'", token, key)));
				}
				state.insert(token, count);
			}
		}

		Ok(table)
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
