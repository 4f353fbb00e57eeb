//! Server configuration loaded from JSON.

use std::fs;

use rs_nlp_core::corpus::config::LoaderConfig;
use serde::{Deserialize, Serialize};

/// Environment variable holding the configuration path.
pub const CONFIG_ENV: &str = "RS_NLP_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "./rs-nlp.json";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
	/// n-gram order used at startup (1 or 2).
	#[serde(default = "default_order")]
	pub order: usize,
	#[serde(default = "default_train_dir")]
	pub train_dir: String,
	#[serde(default = "default_test_dir")]
	pub test_dir: String,
	/// Binary model cache; derived from `train_dir` when absent.
	#[serde(default)]
	pub cache_path: Option<String>,
	/// `word,explanation` listing for segmentation.
	#[serde(default)]
	pub word_dictionary: Option<String>,
	/// U+F8F5-separated listing for lemmatization.
	#[serde(default)]
	pub english_dictionary: Option<String>,
	/// File receiving out-of-vocabulary lemmatization requests.
	#[serde(default)]
	pub oov_path: Option<String>,
	#[serde(default)]
	pub loader: LoaderConfig,
}

fn default_host() -> String {
	"127.0.0.1".to_owned()
}

fn default_port() -> u16 {
	5000
}

fn default_order() -> usize {
	2
}

fn default_train_dir() -> String {
	"./data/train".to_owned()
}

fn default_test_dir() -> String {
	"./data/test".to_owned()
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
			order: default_order(),
			train_dir: default_train_dir(),
			test_dir: default_test_dir(),
			cache_path: None,
			word_dictionary: None,
			english_dictionary: None,
			oov_path: None,
			loader: LoaderConfig::default(),
		}
	}
}

/// Loads the configuration (defaults when the file is missing or invalid).
pub fn load_config() -> ServerConfig {
	let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
	match fs::read_to_string(&path) {
		Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
			log::warn!("invalid configuration {}: {}, using defaults", path, e);
			ServerConfig::default()
		}),
		Err(_) => {
			log::info!("no configuration at {}, using defaults", path);
			ServerConfig::default()
		}
	}
}
