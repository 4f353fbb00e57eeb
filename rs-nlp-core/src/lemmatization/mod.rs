//! Rule-based English lemmatization.
//!
//! Inflected forms are reduced by a fixed cascade of suffix rules, each
//! proposing candidate lemmas that are checked against an
//! `EnglishDictionary`. The first rule with a dictionary hit wins. Words
//! no rule can resolve are recorded as out-of-vocabulary.

/// Bilingual dictionary backing the lemmatizer.
pub mod dictionary;

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::{debug, warn};

use crate::error::Result;
pub use dictionary::{DictionaryEntry, EnglishDictionary};

/// Outcome of a lemmatization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lemma {
	/// Dictionary entries of the candidate lemmas that matched.
	Found(Vec<DictionaryEntry>),
	/// The word resolved to nothing; holds the original token.
	NotFound(String),
}

impl fmt::Display for Lemma {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Lemma::Found(entries) => {
				let lines: Vec<String> = entries.iter().map(DictionaryEntry::to_string).collect();
				f.write_str(&lines.join("\n"))
			}
			Lemma::NotFound(word) => write!(f, "{} not found", word),
		}
	}
}

/// A suffix rule: returns candidate lemmas when the word has its shape.
type Rule = fn(&str) -> Option<Vec<String>>;

/// Rules in priority order.
const RULES: [(&str, Rule); 10] = [
	("exact", exact),
	("-ies", ies),
	("-es", es),
	("-s", plural_s),
	("doubled -ing", doubled_ing),
	("-ying", ying),
	("-ing", ing),
	("doubled -ed", doubled_ed),
	("-ied", ied),
	("-ed", ed),
];

fn exact(w: &str) -> Option<Vec<String>> {
	Some(vec![w.to_owned()])
}

fn ies(w: &str) -> Option<Vec<String>> {
	w.strip_suffix("ies").map(|stem| vec![format!("{}y", stem)])
}

fn es(w: &str) -> Option<Vec<String>> {
	w.strip_suffix("es").map(|stem| vec![stem.to_owned()])
}

fn plural_s(w: &str) -> Option<Vec<String>> {
	w.strip_suffix('s').map(|stem| vec![stem.to_owned()])
}

fn doubled_ing(w: &str) -> Option<Vec<String>> {
	undouble(w, "ing", 0).map(|stem| vec![stem])
}

fn ying(w: &str) -> Option<Vec<String>> {
	w.strip_suffix("ying").map(|stem| vec![format!("{}ie", stem)])
}

fn ing(w: &str) -> Option<Vec<String>> {
	w.strip_suffix("ing").map(|stem| vec![stem.to_owned(), format!("{}e", stem)])
}

fn doubled_ed(w: &str) -> Option<Vec<String>> {
	undouble(w, "ed", 1).map(|stem| vec![stem])
}

fn ied(w: &str) -> Option<Vec<String>> {
	w.strip_suffix("ied").map(|stem| vec![format!("{}y", stem)])
}

/// `formed` → `form`, `baked` → `bake`
fn ed(w: &str) -> Option<Vec<String>> {
	w.strip_suffix("ed").map(|stem| vec![stem.to_owned(), format!("{}e", stem)])
}

/// Strips `suffix` and one letter of a doubled consonant before it
/// (`stopping` → `stop`).
///
/// `min_prefix` is the number of chars required before the doubled pair.
fn undouble(word: &str, suffix: &str, min_prefix: usize) -> Option<String> {
	let stem: Vec<char> = word.strip_suffix(suffix)?.chars().collect();
	if stem.len() < min_prefix + 2 {
		return None;
	}
	let (a, b) = (stem[stem.len() - 2], stem[stem.len() - 1]);
	if a == b && a.is_ascii_alphabetic() {
		Some(stem[..stem.len() - 1].iter().collect())
	} else {
		None
	}
}

/// Suffix-stripping lemmatizer with out-of-vocabulary bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Lemmatizer {
	dictionary: EnglishDictionary,
	oov: Vec<String>,
}

impl Lemmatizer {
	pub fn new(dictionary: EnglishDictionary) -> Self {
		Self { dictionary, oov: Vec::new() }
	}

	pub fn dictionary(&self) -> &EnglishDictionary {
		&self.dictionary
	}

	/// Dictionary entries of the first rule producing a hit, without
	/// touching the out-of-vocabulary record.
	pub fn resolve(&self, word: &str) -> Option<Vec<DictionaryEntry>> {
		for (name, rule) in RULES.iter() {
			let Some(candidates) = rule(word) else {
				continue;
			};
			let hits: Vec<DictionaryEntry> = candidates.iter().filter_map(|c| self.dictionary.lookup(c)).collect();
			if !hits.is_empty() {
				debug!("{} resolved by rule {}", word, name);
				return Some(hits);
			}
		}
		None
	}

	/// Lemmatizes `word`, recording it as out-of-vocabulary on failure.
	pub fn lemmatize(&mut self, word: &str) -> Lemma {
		match self.resolve(word) {
			Some(entries) => Lemma::Found(entries),
			None => {
				warn!("out-of-vocabulary token: {}", word);
				self.oov.push(word.to_owned());
				Lemma::NotFound(word.to_owned())
			}
		}
	}

	/// Tokens recorded since the last flush.
	pub fn oov_tokens(&self) -> &[String] {
		&self.oov
	}

	/// Appends the recorded tokens to `path`, one per line, then clears them.
	pub fn flush_oov<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let mut file = OpenOptions::new().create(true).append(true).open(path)?;
		for token in &self.oov {
			writeln!(file, "{}", token)?;
		}
		self.oov.clear();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lemmatizer() -> Lemmatizer {
		let mut dictionary = EnglishDictionary::new();
		for word in ["play", "finish", "fly", "sing", "lie", "stop", "form", "deny", "copy", "use", "love", "bake"] {
			dictionary.insert(word, "gloss");
		}
		Lemmatizer::new(dictionary)
	}

	fn words(lemma: &Lemma) -> Vec<&str> {
		match lemma {
			Lemma::Found(entries) => entries.iter().map(|e| e.word.as_str()).collect(),
			Lemma::NotFound(_) => vec![],
		}
	}

	#[test]
	fn test_rule_cascade() {
		let mut lemmatizer = lemmatizer();
		let cases = [
			("plays", "play"),
			("finishes", "finish"),
			("flies", "fly"),
			("singing", "sing"),
			("lying", "lie"),
			("stopping", "stop"),
			("formed", "form"),
			("denied", "deny"),
			("copied", "copy"),
			("stopped", "stop"),
			("play", "play"),
		];
		for (input, expected) in cases {
			assert_eq!(words(&lemmatizer.lemmatize(input)), vec![expected], "{}", input);
		}
		assert!(lemmatizer.oov_tokens().is_empty());
	}

	#[test]
	fn test_later_rule_used_when_earlier_misses() {
		let mut lemmatizer = lemmatizer();
		// "-es" proposes "us", "-s" finds "use"
		assert_eq!(words(&lemmatizer.lemmatize("uses")), vec!["use"]);
		// "-ing" tries "lov" then "love"
		assert_eq!(words(&lemmatizer.lemmatize("loving")), vec!["love"]);
		assert_eq!(words(&lemmatizer.lemmatize("baked")), vec!["bake"]);
	}

	#[test]
	fn test_not_found_is_recorded() {
		let mut lemmatizer = lemmatizer();
		let lemma = lemmatizer.lemmatize("arbeit");
		assert_eq!(lemma, Lemma::NotFound("arbeit".to_owned()));
		assert_eq!(lemma.to_string(), "arbeit not found");
		assert_eq!(lemmatizer.oov_tokens(), ["arbeit".to_owned()]);

		let path = std::env::temp_dir().join(format!("rs-nlp-oov-{}.txt", std::process::id()));
		lemmatizer.flush_oov(&path).unwrap();
		lemmatizer.lemmatize("zzz");
		lemmatizer.flush_oov(&path).unwrap();
		let written = std::fs::read_to_string(&path).unwrap();
		std::fs::remove_file(&path).unwrap();
		assert_eq!(written, "arbeit\nzzz\n");
		assert!(lemmatizer.oov_tokens().is_empty());
	}

	#[test]
	fn test_undouble_requires_pair() {
		assert_eq!(undouble("stopping", "ing", 0), Some("stop".to_owned()));
		assert_eq!(undouble("sing", "ing", 0), None);
		assert_eq!(undouble("added", "ed", 1), Some("ad".to_owned()));
		assert_eq!(undouble("lled", "ed", 1), None);
		assert_eq!(undouble("ebbed", "ed", 1), Some("eb".to_owned()));
	}
}
