use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NlpError;

/// Sentence-start boundary marker used as the context of the first token.
pub const BOUNDARY_MARKER: &str = "<s>";

/// Order of an n-gram model.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
	Unigram,
	Bigram,
}

impl Order {
	/// Numeric order `n` (1 or 2).
	pub fn n(self) -> usize {
		match self {
			Order::Unigram => 1,
			Order::Bigram => 2,
		}
	}
}

impl TryFrom<usize> for Order {
	type Error = NlpError;

	fn try_from(n: usize) -> Result<Self, Self::Error> {
		match n {
			1 => Ok(Order::Unigram),
			2 => Ok(Order::Bigram),
			_ => Err(NlpError::InvalidOrder(n)),
		}
	}
}

/// Conditioning context of an n-gram (the `n-1` preceding tokens).
///
/// - `Empty`: unigram, no context
/// - `Start`: first token of a sentence under a bigram model
/// - `Token`: previous token under a bigram model
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Context {
	Empty,
	Start,
	Token(String),
}

impl Context {
	/// Context of the token at `index` in `sentence`.
	///
	/// `index` must be a valid position in `sentence`.
	pub fn at<T: AsRef<str>>(order: Order, sentence: &[T], index: usize) -> Self {
		match order {
			Order::Unigram => Context::Empty,
			Order::Bigram if index == 0 => Context::Start,
			Order::Bigram => Context::Token(sentence[index - 1].as_ref().to_owned()),
		}
	}

	/// String key used in persisted documents.
	pub fn as_key(&self) -> &str {
		match self {
			Context::Empty => "",
			Context::Start => BOUNDARY_MARKER,
			Context::Token(t) => t,
		}
	}

	/// Inverse of `as_key` for a model of the given order.
	///
	/// # Errors
	/// A unigram document may only hold the empty key.
	pub fn from_key(order: Order, key: &str) -> Result<Self, NlpError> {
		match order {
			Order::Unigram if key.is_empty() => Ok(Context::Empty),
			Order::Unigram => Err(NlpError::Format(format!("unexpected unigram context '{}'", key))),
			Order::Bigram if key == BOUNDARY_MARKER => Ok(Context::Start),
			Order::Bigram => Ok(Context::Token(key.to_owned())),
		}
	}
}

impl fmt::Display for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_key())
	}
}
