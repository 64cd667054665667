use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::ClassifierConfig;
use crate::core::errors::HanError;
use crate::core::types::{Mode, Parameter, Tensor, partition_parameters};
use crate::layers::linear::Linear;
use crate::ops::softmax::softmax_rows;

use super::sentence::{SentenceModel, SentenceModelFactory};

/// `SentenceModel` followed by a linear projection to class scores
///
/// `Mode::Train` returns raw logits, `Mode::Eval` softmax probabilities.
/// Both return the word attention of the sentence model unchanged.
#[derive(Debug, Clone)]
pub struct SentenceClassifier {
    han: SentenceModel,
    linear: Linear,
}

impl SentenceClassifier {
    pub fn new(vocabulary_size: usize, config: &ClassifierConfig) -> Result<Self, HanError> {
        let mut rng = StdRng::seed_from_u64(config.model.seed);
        let han = SentenceModelFactory::new().create_with_rng(vocabulary_size, &config.model, &mut rng)?;
        Self::with_sentence_model(han, config.num_classes, &mut rng)
    }

    /// Put a fresh classification head on an existing (e.g. pretrained) model
    pub fn with_sentence_model<R: Rng>(han: SentenceModel, num_classes: usize, rng: &mut R) -> Result<Self, HanError> {
        let linear = Linear::new("classifier", han.sentence_dim(), num_classes, true, rng)?;
        Ok(Self { han, linear })
    }

    /// # Returns
    /// * `[batch, num_classes]` logits (train) or probabilities (eval)
    /// * word attention `[longest sentence, batch]`
    pub fn forward<S: AsRef<[u32]>>(&self, x: &[S], mode: Mode) -> Result<(Tensor, Tensor), HanError> {
        let (sentences, attention) = self.han.forward(x)?;
        let logits = self.linear.forward(&sentences)?;
        let output = match mode {
            Mode::Train => logits.with_name("logits"),
            Mode::Eval => softmax_rows(&logits)?,
        };
        Ok((output, attention))
    }

    pub fn num_classes(&self) -> usize {
        self.linear.out_features()
    }

    pub fn sentence_model(&self) -> &SentenceModel {
        &self.han
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        let mut parameters = self.han.parameters();
        parameters.extend(self.linear.parameters());
        parameters
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        let mut parameters = self.han.parameters_mut();
        parameters.extend(self.linear.parameters_mut());
        parameters
    }

    /// `(sparse, dense)`; the classification head is always dense
    pub fn sparse_dense_parameters(&self) -> (Vec<&Parameter>, Vec<&Parameter>) {
        partition_parameters(self.parameters())
    }
}
