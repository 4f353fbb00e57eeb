mod config;

use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::Deserialize;

use rs_nlp_core::corpus::Corpus;
use rs_nlp_core::io::build_output_path;
use rs_nlp_core::lemmatization::{EnglishDictionary, Lemmatizer};
use rs_nlp_core::model::{CachePolicy, LanguageModel, Order};
use rs_nlp_core::segmentation::{Segmenter, Strategy, WordDictionary};
use rs_nlp_core::NlpError;

use config::{load_config, ServerConfig};

/// Query parameters for `/v1/score`
#[derive(Deserialize)]
struct ScoreParams {
	sentence: Option<String>, // whitespace-separated tokens
}

#[derive(Deserialize)]
struct OrderQuery {
	order: Option<usize>,
}

#[derive(Deserialize)]
struct SegmentParams {
	text: Option<String>,
	strategy: Option<String>, // fmm, rmm, rmin, bidirectional (default) or fmm-rmin
}

#[derive(Deserialize)]
struct LemmaParams {
	word: Option<String>,
}

struct SharedData {
	config: ServerConfig,
	model: Option<LanguageModel>,
	test: Corpus,
	segmenter: Option<Segmenter>,
	lemmatizer: Option<Lemmatizer>,
}

impl SharedData {
	/// Builds every component the configuration allows.
	///
	/// Missing pieces are logged and left empty; their endpoints answer 503.
	fn new(config: ServerConfig) -> Self {
		let (model, test) = match train(&config, config.order, CachePolicy::Reuse) {
			Ok((model, test)) => (Some(model), test),
			Err(e) => {
				error!("language model unavailable: {}", e);
				(None, Corpus::new())
			}
		};

		let segmenter = config.word_dictionary.as_ref().and_then(|path| match WordDictionary::from_file(path) {
			Ok(dictionary) => Some(Segmenter::new(dictionary)),
			Err(e) => {
				error!("word dictionary {} unavailable: {}", path, e);
				None
			}
		});

		let lemmatizer = config.english_dictionary.as_ref().and_then(|path| match EnglishDictionary::from_file(path) {
			Ok(dictionary) => Some(Lemmatizer::new(dictionary)),
			Err(e) => {
				error!("english dictionary {} unavailable: {}", path, e);
				None
			}
		});

		Self { config, model, test, segmenter, lemmatizer }
	}
}

/// Loads the model and the held-out corpus.
///
/// `CachePolicy::Reuse` trusts a cache that still matches the corpora;
/// `CachePolicy::Refresh` always retrains and rewrites it.
fn train(config: &ServerConfig, order: usize, policy: CachePolicy) -> Result<(LanguageModel, Corpus), NlpError> {
	let order = Order::try_from(order)?;
	let cache = match &config.cache_path {
		Some(path) => PathBuf::from(path),
		None => build_output_path(&config.train_dir, "bin")?,
	};
	LanguageModel::load_or_train_with_test(order, &config.train_dir, &config.test_dir, &config.loader, cache, policy)
}

fn unavailable(what: &str) -> HttpResponse {
	HttpResponse::ServiceUnavailable().body(format!("No {} loaded", what))
}

/// HTTP GET endpoint `/v1/info`
#[get("/v1/info")]
async fn get_info(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.model {
		Some(model) => HttpResponse::Ok().body(format!(
			"order: {}\ncontexts: {}\ntest sentences: {}",
			model.order().n(),
			model.frequencies().len(),
			shared_data.test.len()
		)),
		None => unavailable("model"),
	}
}

/// HTTP PUT endpoint `/v1/load_model`
///
/// Retrains the model of the requested order from the configured corpora,
/// bypassing the cache.
#[put("/v1/load_model")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<OrderQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let order = query.order.unwrap_or(shared_data.config.order);

	match train(&shared_data.config, order, CachePolicy::Refresh) {
		Ok((model, test)) => {
			info!("loaded {}-gram model", order);
			shared_data.model = Some(model);
			shared_data.test = test;
			HttpResponse::Ok().body("Model loaded successfully")
		}
		Err(e @ NlpError::InvalidOrder(_)) => HttpResponse::BadRequest().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	}
}

/// HTTP GET endpoint `/v1/score`
///
/// Returns the probability of the whitespace-separated token sequence.
#[get("/v1/score")]
async fn get_score(data: web::Data<Mutex<SharedData>>, query: web::Query<ScoreParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let Some(model) = &shared_data.model else {
		return unavailable("model");
	};
	let tokens: Vec<&str> = query.sentence.as_deref().unwrap_or_default().split_whitespace().collect();

	match model.score_sentence(&tokens) {
		Ok(p) => HttpResponse::Ok().body(p.to_string()),
		Err(e @ NlpError::MissingVocabulary { .. }) => HttpResponse::BadRequest().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/perplexity`
#[get("/v1/perplexity")]
async fn get_perplexity(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let Some(model) = &shared_data.model else {
		return unavailable("model");
	};

	match model.perplexity(&shared_data.test) {
		Ok(p) => HttpResponse::Ok().body(p.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/segment`
///
/// One token per line; ambiguous results print both candidates separated
/// by a blank line.
#[get("/v1/segment")]
async fn get_segment(data: web::Data<Mutex<SharedData>>, query: web::Query<SegmentParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let Some(segmenter) = &shared_data.segmenter else {
		return unavailable("word dictionary");
	};
	let text = match &query.text {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty text"),
	};
	let strategy = match query.strategy.as_deref().unwrap_or("bidirectional").parse::<Strategy>() {
		Ok(s) => s,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	HttpResponse::Ok().body(segmenter.segment(text, strategy).to_string())
}

/// HTTP GET endpoint `/v1/lemmatize`
#[get("/v1/lemmatize")]
async fn get_lemma(data: web::Data<Mutex<SharedData>>, query: web::Query<LemmaParams>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let word = match &query.word {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty word"),
	};
	let oov_path = shared_data.config.oov_path.clone();
	let Some(lemmatizer) = shared_data.lemmatizer.as_mut() else {
		return unavailable("english dictionary");
	};

	let lemma = lemmatizer.lemmatize(word);
	if let Some(path) = oov_path {
		if let Err(e) = lemmatizer.flush_oov(&path) {
			error!("failed to record oov tokens in {}: {}", path, e);
		}
	}
	HttpResponse::Ok().body(lemma.to_string())
}

/// Main entry point for the server.
///
/// Reads the configuration (`RS_NLP_CONFIG`, defaults otherwise), builds
/// the shared components behind a `Mutex` and serves them over HTTP.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = load_config();
	let address = (config.host.clone(), config.port);
	let shared_data = web::Data::new(Mutex::new(SharedData::new(config)));

	info!("listening on {}:{}", address.0, address.1);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_info)
			.service(put_model)
			.service(get_score)
			.service(get_perplexity)
			.service(get_segment)
			.service(get_lemma)
	})
		.bind(address)?
		.run()
		.await
}
