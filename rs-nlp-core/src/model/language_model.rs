use std::fs;
use std::path::Path;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cache::{self, CachePolicy, Fingerprint};
use super::context::{Context, Order};
use super::count_table::CountTable;
use super::frequency_table::FrequencyTable;
use super::perplexity::{self, PerplexityReport};
use crate::corpus::config::LoaderConfig;
use crate::corpus::{self, Corpus, Sentence};
use crate::error::{NlpError, Result};

/// Unigram or bigram language model with add-one smoothing.
///
/// Only the frequency table is kept: counts and corpora can be dropped
/// once the model is estimated. The model is read-only afterwards and can
/// be shared between threads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageModel {
	frequencies: FrequencyTable,
}

impl LanguageModel {
	/// Estimates a model from training and test corpora.
	///
	/// Test sentences only contribute the add-one credit, which guarantees
	/// that every test sentence can be scored.
	///
	/// # Errors
	/// Returns `NlpError::Format` if both corpora hold no token.
	pub fn train(order: Order, train: &[Sentence], test: &[Sentence]) -> Result<Self> {
		let counts = CountTable::compute(order, train, test);
		let model = Self::from_counts(&counts)?;
		info!(
			"trained {}-gram model: {} training sentences, {} test sentences, {} contexts",
			order.n(),
			train.len(),
			test.len(),
			model.frequencies.len()
		);
		Ok(model)
	}

	/// Estimates a model from precomputed counts.
	pub fn from_counts(counts: &CountTable) -> Result<Self> {
		FrequencyTable::compute(counts)
			.map(Self::from_frequencies)
			.ok_or_else(|| NlpError::Format("cannot estimate a model from empty counts".to_owned()))
	}

	/// Wraps a precomputed frequency table.
	pub fn from_frequencies(frequencies: FrequencyTable) -> Self {
		Self { frequencies }
	}

	/// Loads both corpus directories and trains on them.
	pub fn from_directories<PT, PE>(order: Order, train_dir: PT, test_dir: PE, config: &LoaderConfig) -> Result<Self>
	where
		PT: AsRef<Path>,
		PE: AsRef<Path>,
	{
		let train = corpus::load_corpus(train_dir, config)?;
		let test = corpus::load_corpus(test_dir, config)?;
		Self::train(order, &train, &test)
	}

	/// Loads the binary cache if it still matches the inputs, otherwise
	/// trains from the corpus directories and rewrites the cache.
	///
	/// The cache is keyed on the order, the loader configuration and the
	/// size and modification time of every corpus file.
	pub fn load_or_train<PT, PE, PC>(
		order: Order,
		train_dir: PT,
		test_dir: PE,
		config: &LoaderConfig,
		cache_path: PC,
	) -> Result<Self>
	where
		PT: AsRef<Path>,
		PE: AsRef<Path>,
		PC: AsRef<Path>,
	{
		let fingerprint = Fingerprint::new(order, &train_dir, &test_dir, config)?;
		if let Some(model) = cache::read(&cache_path, &fingerprint) {
			return Ok(model);
		}

		let model = Self::from_directories(order, train_dir, test_dir, config)?;
		cache::write(cache_path, &fingerprint, &model)?;
		Ok(model)
	}

	/// Like `load_or_train`, but also returns the test corpus, loaded once.
	///
	/// `CachePolicy::Refresh` retrains even when the cache matches.
	pub fn load_or_train_with_test<PT, PE, PC>(
		order: Order,
		train_dir: PT,
		test_dir: PE,
		config: &LoaderConfig,
		cache_path: PC,
		policy: CachePolicy,
	) -> Result<(Self, Corpus)>
	where
		PT: AsRef<Path>,
		PE: AsRef<Path>,
		PC: AsRef<Path>,
	{
		let fingerprint = Fingerprint::new(order, &train_dir, &test_dir, config)?;
		let test = corpus::load_corpus(test_dir, config)?;
		if policy == CachePolicy::Reuse {
			if let Some(model) = cache::read(&cache_path, &fingerprint) {
				return Ok((model, test));
			}
		}

		let train = corpus::load_corpus(train_dir, config)?;
		let model = Self::train(order, &train, &test)?;
		cache::write(cache_path, &fingerprint, &model)?;
		Ok((model, test))
	}

	/// Writes the model in the binary cache format.
	pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		fs::write(path, bytes)?;
		Ok(())
	}

	/// Reads a model written by `save_binary`.
	pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}

	pub fn order(&self) -> Order {
		self.frequencies.order()
	}

	/// Estimated conditional probabilities.
	pub fn frequencies(&self) -> &FrequencyTable {
		&self.frequencies
	}

	/// P(token | context) with explicit failure on unknown vocabulary.
	fn conditional<T: AsRef<str>>(&self, sentence: &[T], index: usize) -> Result<f64> {
		let context = Context::at(self.order(), sentence, index);
		let token = sentence[index].as_ref();
		self.frequencies.probability(&context, token).ok_or_else(|| NlpError::MissingVocabulary {
			context: context.as_key().to_owned(),
			token: token.to_owned(),
		})
	}

	/// Probability of a token sequence under the model.
	///
	/// The product is not clamped: long sentences may underflow to 0.
	/// An empty sentence scores 1.
	///
	/// # Errors
	/// `NlpError::MissingVocabulary` if a token or context was never counted.
	pub fn score_sentence<T: AsRef<str>>(&self, sentence: &[T]) -> Result<f64> {
		let mut probability = 1.0;
		for index in 0..sentence.len() {
			probability *= self.conditional(sentence, index)?;
		}
		Ok(probability)
	}

	/// Base-2 log-probability of a token sequence.
	///
	/// Sums the same conditional probabilities as `score_sentence` in the
	/// log domain, so it never underflows.
	pub fn log_probability<T: AsRef<str>>(&self, sentence: &[T]) -> Result<f64> {
		let mut log_sum = 0.0;
		for index in 0..sentence.len() {
			log_sum += self.conditional(sentence, index)?.log2();
		}
		Ok(log_sum)
	}

	/// Perplexity over a held-out corpus (see `perplexity::evaluate_perplexity`).
	pub fn perplexity(&self, test: &[Sentence]) -> Result<f64> {
		perplexity::evaluate_perplexity(test, self)
	}

	/// Perplexity with its bookkeeping.
	pub fn perplexity_report(&self, test: &[Sentence]) -> Result<PerplexityReport> {
		perplexity::evaluate_report(test, self)
	}

	/// Samples a token sequence from the model.
	///
	/// Bigram sampling starts from the boundary marker and follows the
	/// drawn tokens; it stops early when the current token has no outgoing
	/// distribution. Unigram sampling draws `max_len` independent tokens.
	pub fn generate<R: Rng>(&self, max_len: usize, rng: &mut R) -> Vec<String> {
		let mut tokens: Vec<String> = Vec::with_capacity(max_len);
		let mut context = match self.order() {
			Order::Unigram => Context::Empty,
			Order::Bigram => Context::Start,
		};

		while tokens.len() < max_len {
			let next = match self.frequencies.distribution(&context).and_then(|d| d.sample(rng)) {
				Some(token) => token.to_owned(),
				None => break,
			};
			if self.order() == Order::Bigram {
				context = Context::Token(next.clone());
			}
			tokens.push(next);
		}

		tokens
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn sentences(raw: &[&[&str]]) -> Vec<Sentence> {
		raw.iter().map(|s| s.iter().map(|t| (*t).to_owned()).collect()).collect()
	}

	#[test]
	fn test_empty_sentence_scores_one() {
		let model = LanguageModel::train(Order::Bigram, &sentences(&[&["A"]]), &[]).unwrap();
		let empty: [&str; 0] = [];
		assert_eq!(model.score_sentence(&empty).unwrap(), 1.0);
		assert_eq!(model.log_probability(&empty).unwrap(), 0.0);
	}

	#[test]
	fn test_bigram_score_chains_from_boundary() {
		let train = sentences(&[&["A", "B"]]);
		let test = sentences(&[&["A", "C"]]);
		let model = LanguageModel::train(Order::Bigram, &train, &test).unwrap();
		// <s> -> {A: 2}, A -> {B: 2, C: 1}
		let p = model.score_sentence(&["A", "C"]).unwrap();
		assert!((p - 1.0 / 3.0).abs() < 1e-12);
		let log_p = model.log_probability(&["A", "C"]).unwrap();
		assert!((log_p - p.log2()).abs() < 1e-12);
	}

	#[test]
	fn test_unigram_score() {
		let model = LanguageModel::train(Order::Unigram, &sentences(&[&["a", "b"]]), &[]).unwrap();
		let p = model.score_sentence(&["a", "a", "b"]).unwrap();
		assert!((p - 0.125).abs() < 1e-12);
	}

	#[test]
	fn test_missing_vocabulary_is_an_error() {
		let model = LanguageModel::train(Order::Bigram, &sentences(&[&["A", "B"]]), &[]).unwrap();
		match model.score_sentence(&["A", "Z"]) {
			Err(NlpError::MissingVocabulary { context, token }) => {
				assert_eq!(context, "A");
				assert_eq!(token, "Z");
			}
			other => panic!("unexpected {:?}", other),
		}
		assert!(matches!(model.score_sentence(&["B"]), Err(NlpError::MissingVocabulary { .. })));
	}

	#[test]
	fn test_empty_corpus_cannot_train() {
		assert!(matches!(LanguageModel::train(Order::Unigram, &[], &[]), Err(NlpError::Format(_))));
	}

	#[test]
	fn test_from_frequencies_matches_training() {
		let train = sentences(&[&["x", "y"], &["y", "x"]]);
		let counts = CountTable::compute(Order::Bigram, &train, &[]);
		let from_counts = LanguageModel::from_counts(&counts).unwrap();
		let frequencies = FrequencyTable::compute(&counts).unwrap();
		assert_eq!(LanguageModel::from_frequencies(frequencies), from_counts);
	}

	#[test]
	fn test_binary_round_trip() {
		let model = LanguageModel::train(Order::Bigram, &sentences(&[&["A", "B", "C"]]), &[]).unwrap();
		let path = std::env::temp_dir().join(format!("rs-nlp-model-{}.bin", std::process::id()));
		model.save_binary(&path).unwrap();
		let restored = LanguageModel::load_binary(&path).unwrap();
		std::fs::remove_file(&path).unwrap();
		assert_eq!(restored, model);
	}

	#[test]
	fn test_generate_follows_bigram_chain() {
		let model = LanguageModel::train(Order::Bigram, &sentences(&[&["a", "b", "c"]]), &[]).unwrap();
		let mut rng = StdRng::seed_from_u64(42);
		// Single path: <s> -> a -> b -> c, then "c" has no successor
		assert_eq!(model.generate(10, &mut rng), vec!["a", "b", "c"]);
		assert_eq!(model.generate(2, &mut rng), vec!["a", "b"]);
	}

	#[test]
	fn test_generate_unigram_length() {
		let model = LanguageModel::train(Order::Unigram, &sentences(&[&["a", "b"]]), &[]).unwrap();
		let mut rng = StdRng::seed_from_u64(1);
		let tokens = model.generate(5, &mut rng);
		assert_eq!(tokens.len(), 5);
		assert!(tokens.iter().all(|t| t == "a" || t == "b"));
	}
}
