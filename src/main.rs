use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use han_rust::core::config::{ClassifierConfig, DocumentClassifierConfig, VocabularyConfig, load_config};
use han_rust::core::errors::HanError;
use han_rust::core::types::{Mode, Tensor};
use han_rust::encode::{DocumentEncode, DocumentEncoder, SentenceEncode, SentenceEncoder};
use han_rust::model::{DocumentClassifier, SentenceClassifier};
use han_rust::tokenizer::{BasicEnglishTokenizer, PretrainedTokenizer, Tokenize};
use han_rust::vocabulary::Vocabulary;

/// Classify texts with a freshly initialised Hierarchical Attention Network
#[derive(Parser, Debug)]
#[command(name = "han_rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Corpus used to build the vocabulary, one text per line
    #[arg(long)]
    corpus: PathBuf,

    /// JSON model configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of classes, overrides the configuration
    #[arg(long)]
    num_classes: Option<usize>,

    /// tokenizer.json to use instead of the basic English tokenizer
    #[arg(long)]
    tokenizer: Option<PathBuf>,

    /// Split texts into sentences and use the document classifier
    #[arg(long)]
    document: bool,

    /// Texts to classify
    #[arg(required = true)]
    texts: Vec<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.tokenizer {
        Some(path) => PretrainedTokenizer::from_file(path).and_then(|tokenizer| run(&cli, tokenizer)),
        None => run(&cli, BasicEnglishTokenizer::new()),
    };
    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run<T: Tokenize + Clone>(cli: &Cli, tokenizer: T) -> Result<(), HanError> {
    let corpus = fs::read_to_string(&cli.corpus)?;
    let sentences = corpus
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| tokenizer.tokenize(line))
        .collect::<Result<Vec<_>, _>>()?;
    info!("Read {} corpus lines from {}", sentences.len(), cli.corpus.display());
    let vocabulary = Vocabulary::build(sentences, &VocabularyConfig::default())?;

    if cli.document {
        classify_documents(cli, vocabulary, tokenizer)
    } else {
        classify_sentences(cli, vocabulary, tokenizer)
    }
}

fn classify_sentences<T: Tokenize + Clone>(cli: &Cli, vocabulary: Vocabulary, tokenizer: T) -> Result<(), HanError> {
    let mut config: ClassifierConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClassifierConfig::default(),
    };
    if let Some(num_classes) = cli.num_classes {
        config.num_classes = num_classes;
    }

    let model = SentenceClassifier::new(vocabulary.len(), &config)?;
    let encoder = SentenceEncoder::with_tokenizer(vocabulary, tokenizer.clone());
    let inputs = encoder.forward(&cli.texts)?;
    let (probabilities, attention) = model.forward(&inputs, Mode::Eval)?;

    for (b, text) in cli.texts.iter().enumerate() {
        println!("{text}");
        println!("  probabilities: {}", format_row(&probabilities, b)?);
        let tokens = tokenizer.tokenize(text)?;
        println!("  word attention: {}", format_attention(&tokens, &attention, b));
    }
    Ok(())
}

fn classify_documents<T: Tokenize + Clone>(cli: &Cli, vocabulary: Vocabulary, tokenizer: T) -> Result<(), HanError> {
    let mut config: DocumentClassifierConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => DocumentClassifierConfig::default(),
    };
    if let Some(num_classes) = cli.num_classes {
        config.num_classes = num_classes;
    }

    let model = DocumentClassifier::new(vocabulary.len(), &config)?;
    let encoder = DocumentEncoder::with_tokenizer(vocabulary, tokenizer);
    let documents = encoder.forward_texts(&cli.texts)?;
    let result = model.forward(&documents, Mode::Eval)?;

    for (b, (text, document)) in cli.texts.iter().zip(&documents).enumerate() {
        println!("{text}");
        println!("  probabilities: {}", format_row(&result.output, b)?);
        let weights: Vec<String> = (0..document.len())
            .map(|s| format!("{:.3}", result.sentence_attention.get2(s, b)))
            .collect();
        println!("  sentence attention: [{}]", weights.join(", "));
    }
    Ok(())
}

fn format_row(tensor: &Tensor, row: usize) -> Result<String, HanError> {
    let values: Vec<String> = tensor.row(row)?.iter().map(|v| format!("{v:.4}")).collect();
    Ok(format!("[{}]", values.join(", ")))
}

fn format_attention(tokens: &[String], attention: &Tensor, column: usize) -> String {
    let steps = attention.dimensions()[0];
    tokens
        .iter()
        .take(steps)
        .enumerate()
        .map(|(t, token)| format!("{token}:{:.3}", attention.get2(t, column)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse() {
        let cli = Cli::parse_from(["han_rust", "--corpus", "news.txt", "--num-classes", "4", "stocks fell"]);
        assert_eq!(cli.corpus, PathBuf::from("news.txt"));
        assert_eq!(cli.num_classes, Some(4));
        assert!(!cli.document);
        assert_eq!(cli.texts, vec!["stocks fell".to_string()]);
    }

    #[test]
    fn test_cli_requires_texts() {
        assert!(Cli::try_parse_from(["han_rust", "--corpus", "news.txt"]).is_err());
    }
}
