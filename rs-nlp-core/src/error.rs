use std::fmt;
use std::io;

/// Errors raised by the corpus loader, the language model and the
/// dictionary-backed tools.
#[derive(Debug)]
pub enum NlpError {
	/// File or directory access failed.
	Io(io::Error),
	/// A persisted document (JSON or binary cache) could not be decoded.
	Parse(String),
	/// Structurally invalid input (bad keys, empty model, ...).
	Format(String),
	/// Only unigram (1) and bigram (2) models are supported.
	InvalidOrder(usize),
	/// A token or context was never seen while counting.
	///
	/// Scoring requires the model to be estimated over a vocabulary
	/// covering every scored sentence.
	MissingVocabulary { context: String, token: String },
}

impl fmt::Display for NlpError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NlpError::Io(e) => write!(f, "I/O error: {}", e),
			NlpError::Parse(s) => write!(f, "parse error: {}", s),
			NlpError::Format(s) => write!(f, "format error: {}", s),
			NlpError::InvalidOrder(n) => write!(f, "unsupported n-gram order {} (expected 1 or 2)", n),
			NlpError::MissingVocabulary { context, token } => {
				write!(f, "token '{}' unknown under context '{}'", token, context)
			}
		}
	}
}

impl std::error::Error for NlpError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			NlpError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for NlpError {
	fn from(e: io::Error) -> Self {
		NlpError::Io(e)
	}
}

impl From<serde_json::Error> for NlpError {
	fn from(e: serde_json::Error) -> Self {
		NlpError::Parse(e.to_string())
	}
}

impl From<postcard::Error> for NlpError {
	fn from(e: postcard::Error) -> Self {
		NlpError::Parse(e.to_string())
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NlpError>;
