use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::io;

/// Field separator of the English-Chinese dictionary listing.
pub const FIELD_SEPARATOR: char = '\u{f8f5}';

/// A dictionary hit: headword and its gloss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
	pub word: String,
	pub gloss: String,
}

impl fmt::Display for DictionaryEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.word, self.gloss)
	}
}

/// Headword → gloss lookup table.
#[derive(Debug, Clone, Default)]
pub struct EnglishDictionary {
	entries: HashMap<String, String>,
}

impl EnglishDictionary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a listing whose lines are `FIELD_SEPARATOR`-separated fields.
	///
	/// The trailing field of each line is discarded; the first remaining
	/// field is the headword, the others form the gloss.
	pub fn parse(content: &str) -> Self {
		let mut dictionary = Self::new();
		for line in content.lines() {
			let mut fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
			fields.pop();
			if let Some((word, gloss)) = fields.split_first() {
				if !word.is_empty() {
					dictionary.insert(word, &gloss.join(" "));
				}
			}
		}
		dictionary
	}

	/// Loads a dictionary file (see `parse`).
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		Ok(Self::parse(&io::read_text(path)?))
	}

	pub fn insert(&mut self, word: &str, gloss: &str) {
		self.entries.insert(word.to_owned(), gloss.to_owned());
	}

	/// Entry for `word`, if present.
	pub fn lookup(&self, word: &str) -> Option<DictionaryEntry> {
		self.entries.get(word).map(|gloss| DictionaryEntry { word: word.to_owned(), gloss: gloss.clone() })
	}

	pub fn contains(&self, word: &str) -> bool {
		self.entries.contains_key(word)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
