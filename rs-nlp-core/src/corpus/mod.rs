//! Corpus loading: tagged text files → sentences of tokens.
//!
//! Input lines look like `迈向/v  充满/v  希望/n  的/u  新/a  世纪/n  。/w`:
//! whitespace-separated tokens, each carrying an optional part-of-speech
//! tag after a separator. Loading strips the tags (unless asked not to),
//! drops stopword tokens and cuts the text into sentences.

/// Loader options (`LoaderConfig`, `DelimiterMode`, `Tokenize`).
pub mod config;

use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::io;
use config::{DelimiterMode, LoaderConfig, Tokenize};

/// A single token (word or character), compared by value.
pub type Token = String;

/// Ordered tokens of one sentence. May be empty.
pub type Sentence = Vec<Token>;

/// Ordered collection of sentences.
pub type Corpus = Vec<Sentence>;

/// Loads every regular file directly inside `dir` and concatenates their
/// sentences.
///
/// Files are visited in name order; subdirectories are ignored.
///
/// # Errors
/// Returns `NlpError::Io` if the directory or one of its files cannot be read.
pub fn load_corpus<P: AsRef<Path>>(dir: P, config: &LoaderConfig) -> Result<Corpus> {
	let folder = io::normalize_folder(dir);
	let mut corpus = Corpus::new();

	for file in io::list_files(&folder)? {
		let text = io::read_text(&file)?;
		let sentences = parse_corpus(&text, config);
		debug!("{}: {} sentences", file.display(), sentences.len());
		corpus.extend(sentences);
	}

	info!("loaded {} sentences from {}", corpus.len(), folder.display());
	Ok(corpus)
}

/// Splits raw tagged text into filtered sentences.
///
/// Empty sentences (e.g. the text after the last delimiter) are kept.
pub fn parse_corpus(text: &str, config: &LoaderConfig) -> Corpus {
	match config.delimiter {
		DelimiterMode::Sentence if !config.sentence_delimiter.is_empty() => text
			.split(config.sentence_delimiter.as_str())
			.map(|raw| parse_sentence(raw, config))
			.collect(),
		DelimiterMode::Sentence => vec![parse_sentence(text, config)],
		DelimiterMode::Line => text.lines().map(|raw| parse_sentence(raw, config)).collect(),
	}
}

/// Turns one raw sentence into tokens.
fn parse_sentence(raw: &str, config: &LoaderConfig) -> Sentence {
	let mut sentence = Sentence::new();

	for item in raw.split_whitespace() {
		// Bare tags such as "/w" carry no word
		if item.starts_with(config.pos_separator) {
			continue;
		}
		let (word, tag) = match item.split_once(config.pos_separator) {
			Some((word, tag)) => (word, Some(tag)),
			None => (item, None),
		};
		if config.stopwords.iter().any(|s| s == word) {
			continue;
		}

		let tag = if config.use_pos { tag } else { None };
		match config.tokenize {
			Tokenize::Word => sentence.push(tagged(word, tag, config.pos_separator)),
			Tokenize::Character => {
				for c in word.chars() {
					sentence.push(tagged(c.encode_utf8(&mut [0; 4]), tag, config.pos_separator));
				}
			}
		}
	}

	sentence
}

fn tagged(word: &str, tag: Option<&str>, separator: char) -> Token {
	match tag {
		Some(tag) => format!("{}{}{}", word, separator, tag),
		None => word.to_owned(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = "19980101-01-001-001/m  迈向/v  充满/v  希望/n  的/u  新/a  世纪/n  ——/w  一九九八年/t  新年/t  讲话/n  （/w  附/v  图片/n  １/m  张/q  ）/w  \n\
		中共中央/nt  总书记/n  、/w  国家/n  主席/n  江/nr  泽民/nr  。/w  \n\
		（/w  一九九七年/t  十二月/t  三十一日/t  ）/w  ";

	#[test]
	fn test_sentence_mode_strips_tags_and_stopwords() {
		let corpus = parse_corpus("他/r  说/v  ，/w  好/a  。/w  走/v  /w  。/w", &LoaderConfig::default());
		assert_eq!(corpus, vec![
			vec!["他".to_owned(), "说".to_owned(), "好".to_owned()],
			vec!["走".to_owned()],
			vec![],
		]);
	}

	#[test]
	fn test_sample_document_sentence_count() {
		let corpus = parse_corpus(SAMPLE, &LoaderConfig::default());
		assert_eq!(corpus.len(), 2);
		assert_eq!(corpus[0].first().map(String::as_str), Some("19980101-01-001-001"));
		assert!(!corpus[0].iter().any(|t| t == "、"));
	}

	#[test]
	fn test_line_mode() {
		let config = LoaderConfig { delimiter: DelimiterMode::Line, ..LoaderConfig::default() };
		let corpus = parse_corpus("a/n b/v\n\nc/n", &config);
		assert_eq!(corpus, vec![vec!["a".to_owned(), "b".to_owned()], vec![], vec!["c".to_owned()]]);
	}

	#[test]
	fn test_character_mode_with_pos() {
		let config = LoaderConfig {
			tokenize: Tokenize::Character,
			use_pos: true,
			..LoaderConfig::default()
		};
		let corpus = parse_corpus("希望/n", &config);
		assert_eq!(corpus, vec![vec!["希/n".to_owned(), "望/n".to_owned()]]);
	}

	#[test]
	fn test_use_pos_keeps_tag() {
		let config = LoaderConfig { use_pos: true, ..LoaderConfig::default() };
		let corpus = parse_corpus("希望/n 新 。/w", &config);
		assert_eq!(corpus[0], vec!["希望/n".to_owned(), "新".to_owned()]);
	}

	#[test]
	fn test_load_corpus_reads_sorted_files() {
		let dir = std::env::temp_dir().join(format!("rs-nlp-corpus-{}", std::process::id()));
		std::fs::create_dir_all(dir.join("nested")).unwrap();
		std::fs::write(dir.join("b.txt"), "二/m 。/w").unwrap();
		std::fs::write(dir.join("a.txt"), "一/m 。/w").unwrap();
		std::fs::write(dir.join("nested").join("c.txt"), "三/m 。/w").unwrap();

		let corpus = load_corpus(&dir, &LoaderConfig::default()).unwrap();
		std::fs::remove_dir_all(&dir).unwrap();

		assert_eq!(corpus, vec![vec!["一".to_owned()], vec![], vec!["二".to_owned()], vec![]]);
	}

	#[test]
	fn test_load_corpus_missing_dir() {
		let result = load_corpus("/definitely/not/here", &LoaderConfig::default());
		assert!(matches!(result, Err(crate::error::NlpError::Io(_))));
	}
}
