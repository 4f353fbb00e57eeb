use serde::{Deserialize, Serialize};

/// How raw text is cut into sentences.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterMode {
	/// Sentences end at `LoaderConfig::sentence_delimiter`.
	#[default]
	Sentence,
	/// One sentence per line.
	Line,
}

/// Granularity of the produced tokens.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tokenize {
	/// One token per segmented word.
	#[default]
	Word,
	/// Each word is expanded into its characters.
	Character,
}

/// Corpus loading options.
///
/// Every field has a default, so a partial JSON document is enough:
/// `{ "delimiter": "line" }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LoaderConfig {
	#[serde(default)]
	pub delimiter: DelimiterMode,
	/// Sentence terminator used in `DelimiterMode::Sentence` (tag included).
	#[serde(default = "default_sentence_delimiter")]
	pub sentence_delimiter: String,
	#[serde(default)]
	pub tokenize: Tokenize,
	/// Keep `word/tag` tokens intact instead of stripping the tag.
	#[serde(default)]
	pub use_pos: bool,
	#[serde(default = "default_pos_separator")]
	pub pos_separator: char,
	/// Tokens whose word part is listed here are dropped.
	#[serde(default = "default_stopwords")]
	pub stopwords: Vec<String>,
}

fn default_sentence_delimiter() -> String {
	"。/w".to_owned()
}

fn default_pos_separator() -> char {
	'/'
}

fn default_stopwords() -> Vec<String> {
	["，", "、", "：", "[", "]", "《", "》", "\"", "！", "；", "？"]
		.iter()
		.map(|s| (*s).to_owned())
		.collect()
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			delimiter: DelimiterMode::default(),
			sentence_delimiter: default_sentence_delimiter(),
			tokenize: Tokenize::default(),
			use_pos: false,
			pos_separator: default_pos_separator(),
			stopwords: default_stopwords(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_config() {
		let config = LoaderConfig::default();
		assert_eq!(config.delimiter, DelimiterMode::Sentence);
		assert_eq!(config.sentence_delimiter, "。/w");
		assert_eq!(config.tokenize, Tokenize::Word);
		assert!(!config.use_pos);
		assert_eq!(config.stopwords.len(), 11);
	}

	#[test]
	fn test_partial_document_uses_defaults() {
		let config: LoaderConfig = serde_json::from_str(r#"{ "delimiter": "line", "use_pos": true }"#).unwrap();
		assert_eq!(config.delimiter, DelimiterMode::Line);
		assert!(config.use_pos);
		assert_eq!(config.pos_separator, '/');
		assert_eq!(config.stopwords, default_stopwords());
	}
}
