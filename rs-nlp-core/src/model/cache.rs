use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::context::Order;
use super::language_model::LanguageModel;
use crate::corpus::config::LoaderConfig;
use crate::error::{NlpError, Result};
use crate::io;

/// Whether a cached model may be reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CachePolicy {
	/// Reuse the cache when its fingerprint still matches the inputs.
	#[default]
	Reuse,
	/// Always retrain and overwrite the cache.
	Refresh,
}

/// Size and modification time of one corpus file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
struct FileStamp {
	path: String,
	len: u64,
	modified: Option<u64>, // nanoseconds since the epoch
}

/// Everything the smoothed counts depend on.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Fingerprint {
	order: usize,
	loader: String, // serialized LoaderConfig
	train: Vec<FileStamp>,
	test: Vec<FileStamp>,
}

impl Fingerprint {
	/// Stamps the corpus directories as they are now.
	pub(crate) fn new<PT, PE>(order: Order, train_dir: PT, test_dir: PE, config: &LoaderConfig) -> Result<Self>
	where
		PT: AsRef<Path>,
		PE: AsRef<Path>,
	{
		Ok(Self {
			order: order.n(),
			loader: serde_json::to_string(config)?,
			train: stamp_dir(train_dir)?,
			test: stamp_dir(test_dir)?,
		})
	}
}

fn stamp_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<FileStamp>> {
	let mut stamps = Vec::new();
	for file in io::list_files(io::normalize_folder(dir))? {
		let metadata = fs::metadata(&file)?;
		let modified = metadata
			.modified()
			.ok()
			.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
			.map(|d| d.as_nanos() as u64);
		stamps.push(FileStamp { path: file.to_string_lossy().into_owned(), len: metadata.len(), modified });
	}
	Ok(stamps)
}

#[derive(Serialize)]
struct CacheRef<'a> {
	fingerprint: &'a Fingerprint,
	model: &'a LanguageModel,
}

#[derive(Deserialize)]
struct CacheEntry {
	fingerprint: Fingerprint,
	model: LanguageModel,
}

/// Returns the cached model if the file holds one built from `fingerprint`.
///
/// Missing, unreadable and stale caches all yield `None`.
pub(crate) fn read<P: AsRef<Path>>(path: P, fingerprint: &Fingerprint) -> Option<LanguageModel> {
	let path = path.as_ref();
	if !path.exists() {
		return None;
	}

	let decoded = fs::read(path)
		.map_err(NlpError::from)
		.and_then(|bytes| postcard::from_bytes::<CacheEntry>(&bytes).map_err(NlpError::from));
	let entry = match decoded {
		Ok(entry) => entry,
		Err(e) => {
			warn!("cache {} is unreadable ({}), rebuilding", path.display(), e);
			return None;
		}
	};
	if entry.fingerprint != *fingerprint {
		warn!("cache {} is stale, rebuilding", path.display());
		return None;
	}

	info!("loaded cached model from {}", path.display());
	Some(entry.model)
}

/// Writes `model` with its fingerprint using `postcard`.
pub(crate) fn write<P: AsRef<Path>>(path: P, fingerprint: &Fingerprint, model: &LanguageModel) -> Result<()> {
	let bytes = postcard::to_stdvec(&CacheRef { fingerprint, model })?;
	fs::write(path, bytes)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::corpus::Sentence;
	use std::path::PathBuf;

	fn workspace(name: &str) -> PathBuf {
		let root = std::env::temp_dir().join(format!("rs-nlp-cache-{}-{}", name, std::process::id()));
		fs::create_dir_all(root.join("train")).unwrap();
		fs::create_dir_all(root.join("test")).unwrap();
		fs::write(root.join("train").join("a.txt"), "A/n  B/n  。/w").unwrap();
		fs::write(root.join("test").join("a.txt"), "A/n  C/n  。/w").unwrap();
		root
	}

	fn fingerprint(root: &Path, order: Order, config: &LoaderConfig) -> Fingerprint {
		Fingerprint::new(order, root.join("train"), root.join("test"), config).unwrap()
	}

	fn model() -> LanguageModel {
		let train: Vec<Sentence> = vec![vec!["A".to_owned(), "B".to_owned()]];
		LanguageModel::train(Order::Bigram, &train, &[]).unwrap()
	}

	#[test]
	fn test_fingerprint_tracks_inputs() {
		let root = workspace("inputs");
		let config = LoaderConfig::default();
		let base = fingerprint(&root, Order::Bigram, &config);
		assert_eq!(fingerprint(&root, Order::Bigram, &config), base);
		assert_ne!(fingerprint(&root, Order::Unigram, &config), base);

		let mut by_line = config.clone();
		by_line.delimiter = crate::corpus::config::DelimiterMode::Line;
		assert_ne!(fingerprint(&root, Order::Bigram, &by_line), base);

		fs::write(root.join("test").join("a.txt"), "A/n  C/n  D/n  。/w").unwrap();
		assert_ne!(fingerprint(&root, Order::Bigram, &config), base);

		fs::write(root.join("test").join("b.txt"), "").unwrap();
		assert_ne!(fingerprint(&root, Order::Bigram, &config), base);

		fs::remove_dir_all(&root).unwrap();
	}

	#[test]
	fn test_read_requires_matching_fingerprint() {
		let root = workspace("read");
		let config = LoaderConfig::default();
		let path = root.join("model.bin");
		let current = fingerprint(&root, Order::Bigram, &config);

		assert_eq!(read(&path, &current), None);
		write(&path, &current, &model()).unwrap();
		assert_eq!(read(&path, &current), Some(model()));
		assert_eq!(read(&path, &fingerprint(&root, Order::Unigram, &config)), None);

		fs::write(&path, b"not a cache").unwrap();
		assert_eq!(read(&path, &current), None);

		fs::remove_dir_all(&root).unwrap();
	}
}
