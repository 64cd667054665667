use crate::core::config::{DocumentClassifierConfig, SentenceModelConfig};
use crate::core::errors::HanError;
use crate::encode::DocumentEncoder;
use crate::model::DocumentClassifier;
use crate::tokenizer::Tokenize;
use crate::vocabulary::Vocabulary;

use super::TrainProtocol;
use super::collate::CollateDocumentFn;

/// Train a `DocumentClassifier`; texts are split into sentences when collated
#[derive(Debug, Clone, Default)]
pub struct DocumentTrainImpl {
    model: SentenceModelConfig,
    document_dim: Option<usize>,
}

impl DocumentTrainImpl {
    pub fn new(model: SentenceModelConfig, document_dim: Option<usize>) -> Self {
        Self { model, document_dim }
    }
}

impl<T: Tokenize> TrainProtocol<T> for DocumentTrainImpl {
    type Encoder = DocumentEncoder<T>;
    type Collate = CollateDocumentFn<DocumentEncoder<T>>;
    type Model = DocumentClassifier;

    fn create_encoder(&self, vocabulary: Vocabulary, tokenizer: T) -> Self::Encoder {
        DocumentEncoder::with_tokenizer(vocabulary, tokenizer)
    }

    fn create_collate_fn(&self, encoder: Self::Encoder) -> Self::Collate {
        CollateDocumentFn::new(encoder)
    }

    fn create_model(&self, num_classes: usize, vocabulary_size: usize) -> Result<Self::Model, HanError> {
        let config = DocumentClassifierConfig {
            num_classes,
            document_dim: self.document_dim,
            model: self.model.clone(),
        };
        DocumentClassifier::new(vocabulary_size, &config)
    }
}
