//! Hierarchical Attention Network on the CPU
//!
//! Text goes through a `Tokenize` implementation and a `Vocabulary` into word
//! index sequences (`encode`). `SentenceModel` turns each sequence into a
//! sentence vector with a bidirectional GRU and word attention;
//! `SentenceClassifier` and `DocumentClassifier` put classification heads on
//! top, the latter with a second attention level over sentences.

pub mod core;
pub mod encode;
pub mod example;
pub mod layers;
pub mod model;
pub mod ops;
pub mod tokenizer;
pub mod vocabulary;

pub use crate::core::config::{
    ClassifierConfig, DocumentClassifierConfig, PretrainedConfig, SentenceModelConfig, TokenOrdering,
    VocabularyConfig, load_config,
};
pub use crate::core::errors::HanError;
pub use crate::core::types::{Mode, Parameter, Partition, Tensor};
pub use model::{DocumentClassifier, DocumentOutput, SentenceClassifier, SentenceModel, SentenceModelFactory};
pub use vocabulary::{Vocabulary, VocabularyBuilder};
