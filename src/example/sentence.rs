use crate::core::config::{ClassifierConfig, SentenceModelConfig};
use crate::core::errors::HanError;
use crate::encode::SentenceEncoder;
use crate::model::SentenceClassifier;
use crate::tokenizer::Tokenize;
use crate::vocabulary::Vocabulary;

use super::TrainProtocol;
use super::collate::CollateSentenceFn;

/// Train a `SentenceClassifier` on whole texts treated as one sentence
#[derive(Debug, Clone, Default)]
pub struct SentenceTrainImpl {
    model: SentenceModelConfig,
}

impl SentenceTrainImpl {
    pub fn new(model: SentenceModelConfig) -> Self {
        Self { model }
    }
}

impl<T: Tokenize> TrainProtocol<T> for SentenceTrainImpl {
    type Encoder = SentenceEncoder<T>;
    type Collate = CollateSentenceFn<SentenceEncoder<T>>;
    type Model = SentenceClassifier;

    fn create_encoder(&self, vocabulary: Vocabulary, tokenizer: T) -> Self::Encoder {
        SentenceEncoder::with_tokenizer(vocabulary, tokenizer)
    }

    fn create_collate_fn(&self, encoder: Self::Encoder) -> Self::Collate {
        CollateSentenceFn::new(encoder)
    }

    fn create_model(&self, num_classes: usize, vocabulary_size: usize) -> Result<Self::Model, HanError> {
        let config = ClassifierConfig {
            num_classes,
            model: self.model.clone(),
        };
        SentenceClassifier::new(vocabulary_size, &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::VocabularyConfig;
    use crate::core::types::Mode;
    use crate::example::Collate;
    use crate::ops::loss::cross_entropy;
    use crate::tokenizer::BasicEnglishTokenizer;

    #[test]
    fn test_protocol_end_to_end() {
        let _ = env_logger::builder().is_test(true).try_init();
        let tokenizer = BasicEnglishTokenizer::new();
        let corpus = [
            (1, "Stocks slid as oil prices climbed."),
            (2, "The striker scored twice in the final."),
            (4, "New chip doubles battery life."),
        ];
        let vocabulary = Vocabulary::build(
            corpus.iter().map(|(_, text)| tokenizer.split(text)),
            &VocabularyConfig::default(),
        )
        .unwrap();
        let vocabulary_size = vocabulary.len();

        let protocol = SentenceTrainImpl::new(SentenceModelConfig {
            embedding_dim: 8,
            gru_hidden_size: 4,
            sentence_dim: 6,
            ..SentenceModelConfig::default()
        });
        let encoder = protocol.create_encoder(vocabulary, tokenizer);
        let collate = TrainProtocol::<BasicEnglishTokenizer>::create_collate_fn(&protocol, encoder);
        let model = TrainProtocol::<BasicEnglishTokenizer>::create_model(&protocol, 4, vocabulary_size).unwrap();

        let (targets, inputs) = collate.collate(&corpus).unwrap();
        assert_eq!(targets, vec![0, 1, 3]);

        let (logits, attention) = model.forward(&inputs, Mode::Train).unwrap();
        assert_eq!(logits.dimensions(), &[3, 4]);
        assert_eq!(attention.dimensions()[1], 3);

        let loss = cross_entropy(&logits, &targets).unwrap();
        assert!(loss.is_finite());
        assert!(loss > 0.0);
    }
}
