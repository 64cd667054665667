//! Seam between the core and a training loop
//!
//! A training loop needs three things per dataset: an encoder, a collate
//! function that turns labelled raw texts into model inputs, and a model.
//! `TrainProtocol` produces all three from a vocabulary and a tokenizer, so
//! the loop itself stays the same for sentence and document classification.

pub mod collate;
pub mod document;
pub mod sentence;

pub use collate::{Collate, CollateDocumentFn, CollateSentenceFn};
pub use document::DocumentTrainImpl;
pub use sentence::SentenceTrainImpl;

use crate::core::errors::HanError;
use crate::tokenizer::Tokenize;
use crate::vocabulary::Vocabulary;

/// Factory for everything dataset specific in training
pub trait TrainProtocol<T: Tokenize> {
    type Encoder;
    type Collate: Collate;
    type Model;

    fn create_encoder(&self, vocabulary: Vocabulary, tokenizer: T) -> Self::Encoder;

    fn create_collate_fn(&self, encoder: Self::Encoder) -> Self::Collate;

    /// `vocabulary_size` includes the padding index
    fn create_model(&self, num_classes: usize, vocabulary_size: usize) -> Result<Self::Model, HanError>;
}
