use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_nlp_core::corpus::config::LoaderConfig;
use rs_nlp_core::corpus::load_corpus;
use rs_nlp_core::lemmatization::{EnglishDictionary, Lemmatizer};
use rs_nlp_core::model::{LanguageModel, Order};
use rs_nlp_core::segmentation::{Segmenter, Strategy, WordDictionary};

/// Shows the `info!` summaries unless `RUST_LOG` says otherwise.
fn logger() -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger().init();

    // Corpus files are POS-tagged and pre-segmented ("今天/t  天气/n ..."),
    // one directory for training and one held out for evaluation
    let config = LoaderConfig::default();
    let train = load_corpus("./data/train", &config)?;
    let test = load_corpus("./data/test", &config)?;
    println!("{} training sentences, {} test sentences", train.len(), test.len());

    // Test vocabulary is added to the counts with the add-one floor,
    // so every test sentence can be scored
    for order in [Order::Unigram, Order::Bigram] {
        let model = LanguageModel::train(order, &train, &test)?;
        let report = model.perplexity_report(&test)?;
        println!(
            "{}-gram perplexity: {} ({} sentences scored 0)",
            order.n(),
            report.perplexity,
            report.excluded
        );
    }

    // The binary cache is reused on the next run
    let model = LanguageModel::load_or_train(Order::Bigram, "./data/train", "./data/test", &config, "./data/train.bin")?;

    if let Some(sentence) = test.first() {
        println!("P({}) = {}", sentence.join(" "), model.score_sentence(sentence)?);
    }

    // Random walk over the bigram distributions (seeded for repeatable output)
    let mut rng = StdRng::seed_from_u64(42);
    println!("Generated: {}", model.generate(20, &mut rng).join(" "));

    // Segmentation: "研究生命起源" is the classic ambiguous case
    let dictionary: WordDictionary = ["研究", "研究生", "生命", "命", "起源"].into_iter().collect();
    let segmenter = Segmenter::new(dictionary);
    for strategy in ["fmm", "rmm", "rmin", "bidirectional", "fmm-rmin"] {
        let segmentation = segmenter.segment("研究生命起源", strategy.parse::<Strategy>()?);
        println!("{} (ambiguous: {}):\n{}\n", strategy, segmentation.is_ambiguous(), segmentation);
    }

    // Lemmatization against a small bilingual dictionary
    let mut dictionary = EnglishDictionary::new();
    dictionary.insert("fly", "v. 飞");
    dictionary.insert("stop", "v. 停止");
    dictionary.insert("lie", "v. 躺");
    let mut lemmatizer = Lemmatizer::new(dictionary);
    for word in ["flies", "stopped", "lying", "arbeit"] {
        println!("{}", lemmatizer.lemmatize(word));
    }
    println!("Out-of-vocabulary: {:?}", lemmatizer.oov_tokens());

    Ok(())
}
