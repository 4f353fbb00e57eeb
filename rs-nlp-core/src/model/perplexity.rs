//! Held-out perplexity.
//!
//! Convention: base-2 logarithms, and the mean is taken over **all** test
//! sentences. Sentences whose probability is exactly 0 (product underflow)
//! are left out of the log sum but still counted in the denominator, which
//! biases the estimate downward. When every sentence is left out the
//! perplexity is exactly 1.

use log::{debug, info};

use super::language_model::LanguageModel;
use crate::corpus::Sentence;
use crate::error::Result;

/// Outcome of a perplexity evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerplexityReport {
	/// `2^(-log2_sum / sentences)`
	pub perplexity: f64,
	/// Number of test sentences (the denominator).
	pub sentences: usize,
	/// Sentences left out of the sum because they scored 0.
	pub excluded: usize,
	/// Sum of `log2 P` over the included sentences.
	pub log2_sum: f64,
}

/// Perplexity of `model` over `test`.
///
/// # Errors
/// Propagates `NlpError::MissingVocabulary` from the scorer.
pub fn evaluate_perplexity(test: &[Sentence], model: &LanguageModel) -> Result<f64> {
	Ok(evaluate_report(test, model)?.perplexity)
}

/// Same as `evaluate_perplexity`, keeping the intermediate figures.
pub fn evaluate_report(test: &[Sentence], model: &LanguageModel) -> Result<PerplexityReport> {
	let mut log2_sum = 0.0;
	let mut excluded = 0;

	for (index, sentence) in test.iter().enumerate() {
		let probability = model.score_sentence(sentence)?;
		if probability == 0.0 {
			debug!("sentence {} scored 0, left out of the log sum", index);
			excluded += 1;
			continue;
		}
		log2_sum += probability.log2();
	}

	// An empty test set yields 0/0; treat it like a fully excluded one
	let mean = if test.is_empty() { 0.0 } else { log2_sum / test.len() as f64 };
	let perplexity = (-mean).exp2();

	info!(
		"perplexity {:.4} over {} sentences ({} excluded)",
		perplexity,
		test.len(),
		excluded
	);

	Ok(PerplexityReport { perplexity, sentences: test.len(), excluded, log2_sum })
}
