use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::DocumentClassifierConfig;
use crate::core::errors::HanError;
use crate::core::types::{Mode, Parameter, Tensor, partition_parameters};
use crate::layers::attention::AttentionModel;
use crate::layers::linear::Linear;
use crate::ops::softmax::softmax_rows;

use super::sentence::{SentenceModel, SentenceModelFactory};

/// Result of a `DocumentClassifier` forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutput {
    /// `[batch, num_classes]` logits (train) or probabilities (eval)
    pub output: Tensor,
    /// `[longest sentence, total sentences]`, columns in document then sentence order
    pub word_attention: Tensor,
    /// `[most sentences, batch]`
    pub sentence_attention: Tensor,
}

/// Full two-level hierarchy: words → sentence vectors → document vector → classes
#[derive(Debug, Clone)]
pub struct DocumentClassifier {
    han: SentenceModel,
    attention: AttentionModel,
    linear: Linear,
}

impl DocumentClassifier {
    pub fn new(vocabulary_size: usize, config: &DocumentClassifierConfig) -> Result<Self, HanError> {
        let mut rng = StdRng::seed_from_u64(config.model.seed);
        let han = SentenceModelFactory::new().create_with_rng(vocabulary_size, &config.model, &mut rng)?;
        let document_dim = config.document_dim.unwrap_or(config.model.sentence_dim);
        Self::with_sentence_model(han, document_dim, config.num_classes, &mut rng)
    }

    pub fn with_sentence_model<R: Rng>(
        han: SentenceModel,
        document_dim: usize,
        num_classes: usize,
        rng: &mut R,
    ) -> Result<Self, HanError> {
        let attention = AttentionModel::new("sentence_attention", han.sentence_dim(), document_dim, rng)?;
        let linear = Linear::new("classifier", document_dim, num_classes, true, rng)?;
        Ok(Self { han, attention, linear })
    }

    /// Classify a batch of documents, each a list of word index sequences
    ///
    /// # Errors
    /// `EmptyBatch` for no documents, `EmptySequence` for a document without
    /// sentences or a sentence without words
    pub fn forward(&self, documents: &[Vec<Vec<u32>>], mode: Mode) -> Result<DocumentOutput, HanError> {
        if documents.is_empty() {
            return Err(HanError::EmptyBatch);
        }
        let counts: Vec<usize> = documents.iter().map(Vec::len).collect();
        if let Some(position) = counts.iter().position(|&count| count == 0) {
            return Err(HanError::EmptySequence { position });
        }

        let sentences: Vec<&[u32]> = documents.iter().flatten().map(Vec::as_slice).collect();
        let (sentence_vectors, word_attention) = self.han.forward(&sentences)?;

        // Regroup sentence vectors into (most sentences, batch, sentence dim)
        let max_sentences = counts.iter().copied().max().unwrap_or(0);
        let batch = documents.len();
        debug!(
            "DocumentClassifier forward: {} documents, {} sentences, at most {} per document",
            batch,
            sentences.len(),
            max_sentences
        );
        let mut grouped = Tensor::zeros(
            "sentence_vectors",
            vec![max_sentences, batch, self.han.sentence_dim()],
        );
        let mut flat_index = 0;
        for (b, &count) in counts.iter().enumerate() {
            for s in 0..count {
                grouped
                    .vector3_mut(s, b)
                    .copy_from_slice(sentence_vectors.row(flat_index)?);
                flat_index += 1;
            }
        }

        let (document_vectors, sentence_attention) = self.attention.forward(&grouped, &counts)?;
        let logits = self.linear.forward(&document_vectors)?;
        let output = match mode {
            Mode::Train => logits.with_name("logits"),
            Mode::Eval => softmax_rows(&logits)?,
        };
        Ok(DocumentOutput {
            output,
            word_attention,
            sentence_attention,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.linear.out_features()
    }

    pub fn document_dim(&self) -> usize {
        self.attention.output_dim()
    }

    pub fn sentence_model(&self) -> &SentenceModel {
        &self.han
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        let mut parameters = self.han.parameters();
        parameters.extend(self.attention.parameters());
        parameters.extend(self.linear.parameters());
        parameters
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        let mut parameters = self.han.parameters_mut();
        parameters.extend(self.attention.parameters_mut());
        parameters.extend(self.linear.parameters_mut());
        parameters
    }

    pub fn sparse_dense_parameters(&self) -> (Vec<&Parameter>, Vec<&Parameter>) {
        partition_parameters(self.parameters())
    }
}
