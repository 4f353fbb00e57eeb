use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::io;

/// Word list used by the matching segmenters.
///
/// Tracks the longest entry (in chars) so that scans never try
/// substrings that cannot be in the dictionary.
#[derive(Debug, Clone, Default)]
pub struct WordDictionary {
	words: HashSet<String>,
	max_chars: usize,
}

impl WordDictionary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a `word,explanation` listing, one entry per line.
	///
	/// The explanation is ignored; lines without a comma hold only a word.
	/// Lines with an empty word are skipped.
	pub fn parse(content: &str) -> Self {
		let mut dictionary = Self::new();
		for line in content.lines() {
			let word = match line.split_once(',') {
				Some((word, _)) => word,
				None => line,
			};
			dictionary.insert(word.trim());
		}
		dictionary
	}

	/// Loads a dictionary file (see `parse`).
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		Ok(Self::parse(&io::read_text(path)?))
	}

	/// Adds a word. Empty words are ignored.
	pub fn insert(&mut self, word: &str) {
		if word.is_empty() {
			return;
		}
		self.max_chars = self.max_chars.max(word.chars().count());
		self.words.insert(word.to_owned());
	}

	pub fn contains(&self, word: &str) -> bool {
		self.words.contains(word)
	}

	/// Length in chars of the longest entry.
	pub fn max_chars(&self) -> usize {
		self.max_chars
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}
}

impl<'a> FromIterator<&'a str> for WordDictionary {
	fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
		let mut dictionary = Self::new();
		for word in iter {
			dictionary.insert(word);
		}
		dictionary
	}
}
