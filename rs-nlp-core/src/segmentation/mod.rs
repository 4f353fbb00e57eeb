//! Dictionary-based Chinese word segmentation.
//!
//! Matching strategies scan the text over char boundaries with an explicit
//! cursor:
//! - forward maximum matching (FMM): longest dictionary prefix first
//! - reverse maximum matching (RMM): longest dictionary suffix first
//! - reverse minimum matching: shortest dictionary suffix first
//! - bidirectional: FMM against RMM (or reverse minimum), both candidates
//!   kept when they disagree
//!
//! Tokens borrow from the input. When no dictionary entry matches at the
//! cursor, an empty token is emitted at that position and the scan stops.

/// Word list backing the segmenters.
pub mod dictionary;

use std::fmt;
use std::iter;
use std::str::FromStr;

use log::warn;

pub use dictionary::WordDictionary;

/// Segmentation strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
	ForwardMaximum,
	ReverseMaximum,
	ReverseMinimum,
	/// FMM vs RMM
	Bidirectional,
	/// FMM vs reverse minimum
	ForwardMaxReverseMin,
}

impl FromStr for Strategy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"fmm" => Ok(Strategy::ForwardMaximum),
			"rmm" => Ok(Strategy::ReverseMaximum),
			"rmin" => Ok(Strategy::ReverseMinimum),
			"bidirectional" | "bmm" => Ok(Strategy::Bidirectional),
			"fmm-rmin" => Ok(Strategy::ForwardMaxReverseMin),
			other => Err(format!(
				"Unknown strategy '{}', expected fmm, rmm, rmin, bidirectional or fmm-rmin",
				other
			)),
		}
	}
}

/// Result of a segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segmentation<'a> {
	/// A single candidate (one strategy, or both directions agree).
	Resolved(Vec<&'a str>),
	/// Forward and reverse scans disagree; disambiguation is left to the caller.
	Ambiguous { forward: Vec<&'a str>, reverse: Vec<&'a str> },
}

impl<'a> Segmentation<'a> {
	/// Builds the result of a two-way comparison.
	fn compare(forward: Vec<&'a str>, reverse: Vec<&'a str>) -> Self {
		if forward == reverse {
			Segmentation::Resolved(forward)
		} else {
			Segmentation::Ambiguous { forward, reverse }
		}
	}

	/// All candidates, forward first.
	pub fn candidates(&self) -> Vec<&[&'a str]> {
		match self {
			Segmentation::Resolved(tokens) => vec![tokens.as_slice()],
			Segmentation::Ambiguous { forward, reverse } => vec![forward.as_slice(), reverse.as_slice()],
		}
	}

	pub fn is_ambiguous(&self) -> bool {
		matches!(self, Segmentation::Ambiguous { .. })
	}
}

impl fmt::Display for Segmentation<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let blocks: Vec<String> = self.candidates().iter().map(|c| c.join("\n")).collect();
		f.write_str(&blocks.join("\n\n"))
	}
}

/// Segments text against a `WordDictionary`.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
	dictionary: WordDictionary,
}

impl Segmenter {
	pub fn new(dictionary: WordDictionary) -> Self {
		Self { dictionary }
	}

	pub fn dictionary(&self) -> &WordDictionary {
		&self.dictionary
	}

	/// Runs the selected strategy.
	pub fn segment<'a>(&self, text: &'a str, strategy: Strategy) -> Segmentation<'a> {
		match strategy {
			Strategy::ForwardMaximum => Segmentation::Resolved(self.forward_maximum(text)),
			Strategy::ReverseMaximum => Segmentation::Resolved(self.reverse_maximum(text)),
			Strategy::ReverseMinimum => Segmentation::Resolved(self.reverse_minimum(text)),
			Strategy::Bidirectional => self.bidirectional(text),
			Strategy::ForwardMaxReverseMin => self.forward_max_reverse_min(text),
		}
	}

	/// Forward maximum matching.
	pub fn forward_maximum<'a>(&self, text: &'a str) -> Vec<&'a str> {
		let bounds = char_bounds(text);
		let chars = bounds.len() - 1;
		let mut tokens = Vec::new();
		let mut start = 0;

		loop {
			let longest = chars.min(start + self.dictionary.max_chars());
			let hit = (start + 1..=longest)
				.rev()
				.find(|&end| self.dictionary.contains(&text[bounds[start]..bounds[end]]));
			match hit {
				Some(end) => {
					tokens.push(&text[bounds[start]..bounds[end]]);
					start = end;
					if start == chars {
						break;
					}
				}
				None => {
					warn!("forward matching failed at char {} of {:?}", start, text);
					tokens.push("");
					break;
				}
			}
		}

		tokens
	}

	/// Reverse maximum matching, returned in reading order.
	pub fn reverse_maximum<'a>(&self, text: &'a str) -> Vec<&'a str> {
		self.reverse_scan(text, true)
	}

	/// Reverse minimum matching, returned in reading order.
	pub fn reverse_minimum<'a>(&self, text: &'a str) -> Vec<&'a str> {
		self.reverse_scan(text, false)
	}

	/// Right-to-left scan taking the longest (`maximum`) or shortest suffix.
	fn reverse_scan<'a>(&self, text: &'a str, maximum: bool) -> Vec<&'a str> {
		let bounds = char_bounds(text);
		let mut tokens = Vec::new();
		let mut end = bounds.len() - 1;

		loop {
			let earliest = end.saturating_sub(self.dictionary.max_chars());
			let matches = |start: &usize| self.dictionary.contains(&text[bounds[*start]..bounds[end]]);
			let hit = if maximum {
				(earliest..end).find(matches)
			} else {
				(earliest..end).rev().find(matches)
			};
			match hit {
				Some(start) => {
					tokens.push(&text[bounds[start]..bounds[end]]);
					end = start;
					if end == 0 {
						break;
					}
				}
				None => {
					warn!("reverse matching failed at char {} of {:?}", end, text);
					tokens.push("");
					break;
				}
			}
		}

		tokens.reverse();
		tokens
	}

	/// Compares forward and reverse maximum matching.
	pub fn bidirectional<'a>(&self, text: &'a str) -> Segmentation<'a> {
		Segmentation::compare(self.forward_maximum(text), self.reverse_maximum(text))
	}

	/// Compares forward maximum and reverse minimum matching.
	pub fn forward_max_reverse_min<'a>(&self, text: &'a str) -> Segmentation<'a> {
		Segmentation::compare(self.forward_maximum(text), self.reverse_minimum(text))
	}
}

/// Byte offsets of every char boundary, including `text.len()`.
fn char_bounds(text: &str) -> Vec<usize> {
	text.char_indices().map(|(i, _)| i).chain(iter::once(text.len())).collect()
}
