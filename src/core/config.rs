use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::HanError;

/// Hyperparameters of a randomly initialised `SentenceModel`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceModelConfig {
    /// Width of each embedding row (default 200)
    pub embedding_dim: usize,
    /// Reserved embedding row used for padding (default 0)
    pub padding_idx: u32,
    /// Tag the embedding table as a sparse parameter (default true)
    pub embedding_sparse: bool,
    /// Hidden size of each GRU direction (default 50)
    pub gru_hidden_size: usize,
    /// Width of the attention projection and of the sentence vectors (default 100)
    pub sentence_dim: usize,
    /// Seed for weight initialisation (default 0)
    pub seed: u64,
}

impl Default for SentenceModelConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 200,
            padding_idx: 0,
            embedding_sparse: true,
            gru_hidden_size: 50,
            sentence_dim: 100,
            seed: 0,
        }
    }
}

/// Hyperparameters of a `SentenceModel` built on pretrained vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PretrainedConfig {
    /// Keep the pretrained vectors fixed (default true)
    pub freeze: bool,
    pub padding_idx: u32,
    pub sparse: bool,
    pub gru_hidden_size: usize,
    pub sentence_dim: usize,
    pub seed: u64,
}

impl Default for PretrainedConfig {
    fn default() -> Self {
        Self {
            freeze: true,
            padding_idx: 0,
            sparse: true,
            gru_hidden_size: 50,
            sentence_dim: 100,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub num_classes: usize,
    #[serde(flatten)]
    pub model: SentenceModelConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            num_classes: 2,
            model: SentenceModelConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentClassifierConfig {
    pub num_classes: usize,
    /// Width of the document vector; `None` reuses `sentence_dim`
    pub document_dim: Option<usize>,
    #[serde(flatten)]
    pub model: SentenceModelConfig,
}

impl Default for DocumentClassifierConfig {
    fn default() -> Self {
        Self {
            num_classes: 2,
            document_dim: None,
            model: SentenceModelConfig::default(),
        }
    }
}

/// Order in which vocabulary indices are handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenOrdering {
    /// Descending frequency, ties broken lexicographically
    #[default]
    Frequency,
    /// Order of first appearance in the corpus
    FirstSeen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Index reserved for padding, never assigned to a real token (default 0)
    pub pad_index: u32,
    /// Index returned for unknown tokens; `None` falls back to `pad_index`
    pub default_index: Option<u32>,
    pub ordering: TokenOrdering,
    /// Tokens seen fewer times are left out (default 1)
    pub min_frequency: usize,
    /// Upper bound on the number of real tokens
    pub max_tokens: Option<usize>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            pad_index: 0,
            default_index: None,
            ordering: TokenOrdering::Frequency,
            min_frequency: 1,
            max_tokens: None,
        }
    }
}

/// Read any of the configuration structs from a JSON file
pub fn load_config<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, HanError> {
    let file = File::open(path)?;
    let config = serde_json::from_reader(BufReader::new(file))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sentence_model_defaults() {
        let config = SentenceModelConfig::default();
        assert_eq!(config.embedding_dim, 200);
        assert_eq!(config.padding_idx, 0);
        assert!(config.embedding_sparse);
        assert_eq!(config.gru_hidden_size, 50);
        assert_eq!(config.sentence_dim, 100);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: ClassifierConfig =
            serde_json::from_str(r#"{"num_classes": 4, "gru_hidden_size": 8}"#).unwrap();
        assert_eq!(config.num_classes, 4);
        assert_eq!(config.model.gru_hidden_size, 8);
        assert_eq!(config.model.embedding_dim, 200);

        let vocab: VocabularyConfig =
            serde_json::from_str(r#"{"ordering": "first_seen", "default_index": 1}"#).unwrap();
        assert_eq!(vocab.ordering, TokenOrdering::FirstSeen);
        assert_eq!(vocab.default_index, Some(1));
        assert_eq!(vocab.pad_index, 0);
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("han_rust_config_{}.json", std::process::id()));
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"num_classes": 3, "document_dim": 16, "sentence_dim": 8}}"#).unwrap();
        drop(file);

        let config: DocumentClassifierConfig = load_config(&path).unwrap();
        assert_eq!(config.num_classes, 3);
        assert_eq!(config.document_dim, Some(16));
        assert_eq!(config.model.sentence_dim, 8);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_config_missing_file() {
        let result: Result<SentenceModelConfig, _> = load_config("/nonexistent/han_rust.json");
        assert!(matches!(result, Err(HanError::Io(_))));
    }
}
